use ndarray::{Array1, ArrayView1};
use num_traits::Float;

use super::{Float32Array, ModelError};

/// `(x - mean) / std`, or zero for a constant feature (`std == 0`).
pub fn standardize<F: Float>(x: F, mean: F, std: F) -> F {
    if std != F::zero() { (x - mean) / std } else { F::zero() }
}

/// Standardize a feature vector with the model's `Mu` and `Sigma`.
///
/// Models trained without standardization store both as empty arrays; the
/// input is then returned as is.
pub fn standardize_features(x: ArrayView1<'_, f32>, mu: &Float32Array, sigma: &Float32Array) -> Result<Array1<f32>, ModelError> {
    if mu.is_empty() && sigma.is_empty() {
        return Ok(x.to_owned());
    }
    if mu.len() != x.len() || sigma.len() != x.len() {
        return Err(ModelError::Shape(format!(
            "{} features, {} means, {} standard deviations",
            x.len(),
            mu.len(),
            sigma.len()
        )));
    }

    Ok(x.iter()
        .zip(mu.iter())
        .zip(sigma.iter())
        .map(|((&x, &mean), &std)| standardize(x, mean, std))
        .collect())
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2};

    use super::*;

    #[test]
    fn standardizes_with_nonzero_std() {
        assert_eq!(standardize(10.0f64, 5.0, 2.0), 2.5);
        assert_eq!(standardize(1.0f32, 3.0, 4.0), -0.5);
    }

    #[test]
    fn zero_std_gives_zero() {
        assert_eq!(standardize(10.0f64, 5.0, 0.0), 0.0);
        assert_eq!(standardize(-7.0f32, 1.0, -0.0), 0.0);
    }

    #[test]
    fn standardizes_each_feature() {
        let x = arr1(&[1.1f32, 0.7, 3.0]);
        let mu = arr2(&[[0.1f32, 0.2, 3.0]]).into_dyn();
        let sigma = arr2(&[[1.0f32, 0.5, 0.0]]).into_dyn();
        let z = standardize_features(x.view(), &mu, &sigma).unwrap();
        assert!((z[0] - 1.0).abs() < 1e-6);
        assert!((z[1] - 1.0).abs() < 1e-6);
        assert_eq!(z[2], 0.0);
    }

    #[test]
    fn empty_statistics_pass_input_through() {
        let x = arr1(&[4.0f32, 5.0]);
        let empty = Float32Array::zeros(ndarray::IxDyn(&[0, 0]));
        assert_eq!(standardize_features(x.view(), &empty, &empty).unwrap(), x);
    }

    #[test]
    fn mismatched_lengths_fail() {
        let x = arr1(&[4.0f32, 5.0]);
        let mu = arr1(&[1.0f32]).into_dyn();
        let err = standardize_features(x.view(), &mu, &mu).unwrap_err();
        assert!(matches!(err, ModelError::Shape(_)));
    }
}
