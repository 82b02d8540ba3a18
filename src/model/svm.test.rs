#![cfg(test)]

use ndarray::arr2;

use super::*;
use crate::{
    mat::{
        MatFile,
        writer::{MatWriter, Node},
    },
    model::{load_model, standardize_features, unwrap},
};

fn impl_node(mu: Node, sigma: Node) -> Node {
    Node::record(vec![
        ("Mu", mu),
        ("Sigma", sigma),
        ("SupportVectors", Node::matrix(3, 2, &[0.5, 1.0, -0.5, 2.0, 1.5, -1.0])),
        ("Alpha", Node::column(&[0.25, 0.5, 0.75])),
        ("SupportVectorLabels", Node::column(&[1.0, -1.0, 1.0])),
        ("Bias", Node::scalar(-0.125)),
        (
            "KernelParameters",
            Node::record(vec![
                ("Function", Node::text("polynomial")),
                ("PolyOrder", Node::scalar(2.0)),
                ("Scale", Node::scalar(1.0)),
                ("Offset", Node::scalar(0.0)),
            ]),
        ),
    ])
}

fn compact_struct(predictor_names: Node, mu: Node, sigma: Node) -> Node {
    Node::record(vec![
        (
            "DataSummary",
            Node::record(vec![
                ("PredictorNames", predictor_names),
                ("NumPredictors", Node::scalar(2.0)),
            ]),
        ),
        ("Impl", impl_node(mu, sigma)),
        ("ClassSummary", Node::record(vec![("ClassNames", Node::cellstr(&["no", "yes"]))])),
    ])
}

fn model_writer() -> MatWriter {
    MatWriter::new().compressed().variable(
        "compactStruct",
        compact_struct(Node::cellstr(&["x1", "x2"]), Node::row(&[0.1, 0.2]), Node::row(&[1.0, 0.5])),
    )
}

fn extract(writer: MatWriter) -> Result<PolySvmParams, ModelError> {
    let mat = MatFile::from_bytes(&writer.to_bytes())?;
    let parameters = mat.get(COMPACT_STRUCT_KEY).ok_or(ModelError::MissingVariable(COMPACT_STRUCT_KEY.into()))?;
    PolySvmParams::extract(parameters)
}

#[test]
fn end_to_end_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("miniModelPolySVM.mat");
    model_writer().write_to(&path).unwrap();

    let model = load_model(&path).unwrap();
    let params = PolySvmParams::extract(model.parameters().unwrap()).unwrap();

    assert_eq!(params.mu, arr2(&[[0.1f32, 0.2]]).into_dyn());
    assert_eq!(params.sigma, arr2(&[[1.0f32, 0.5]]).into_dyn());
    assert_eq!(params.predictor_names, NormalizedField::Labels(vec!["x1".into(), "x2".into()]));
    assert_eq!(params.predictor_names.element_type(), "str");
    assert_eq!(params.support_vectors.shape(), &[3, 2]);
    assert_eq!(params.support_vector_count(), 3);
    assert_eq!(params.bias.iter().copied().collect::<Vec<_>>(), vec![-0.125]);
    assert_eq!(params.poly_order.iter().copied().collect::<Vec<_>>(), vec![2.0]);
    assert_eq!(params.class_names.as_labels(), Some(&["no".to_string(), "yes".to_string()][..]));
    params.validate().unwrap();
}

#[test]
fn big_endian_model_extracts_the_same() {
    let little = extract(model_writer()).unwrap();
    let big = extract(
        MatWriter::new().big_endian().variable(
            "compactStruct",
            compact_struct(Node::cellstr(&["x1", "x2"]), Node::row(&[0.1, 0.2]), Node::row(&[1.0, 0.5])),
        ),
    )
    .unwrap();
    assert_eq!(little, big);
}

#[test]
fn repeated_loads_are_identical() {
    let bytes = model_writer().to_bytes();
    let first = PolySvmParams::extract(MatFile::from_bytes(&bytes).unwrap().get(COMPACT_STRUCT_KEY).unwrap()).unwrap();
    let second = PolySvmParams::extract(MatFile::from_bytes(&bytes).unwrap().get(COMPACT_STRUCT_KEY).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn numeric_predictor_names_stay_numeric() {
    let params = extract(MatWriter::new().variable(
        "compactStruct",
        compact_struct(Node::row(&[1.0, 2.0]), Node::row(&[0.1, 0.2]), Node::row(&[1.0, 0.5])),
    ))
    .unwrap();
    assert_eq!(params.predictor_names.element_type(), "float32");
    assert_eq!(params.predictor_names.len(), 2);
}

#[test]
fn kernel_parameters_are_reached_through_impl() {
    let mat = MatFile::from_bytes(&model_writer().to_bytes()).unwrap();
    let root = mat.get(COMPACT_STRUCT_KEY).unwrap();
    assert!(unwrap(root, "KernelParameters").is_err());
    let kernel = crate::model::unwrap_path(root, &CategoryPath::KERNEL_PARAMETERS).unwrap();
    assert!(kernel.get("Scale").is_some());
}

#[test]
fn missing_field_names_full_path() {
    let writer = MatWriter::new().variable(
        "compactStruct",
        Node::record(vec![
            (
                "DataSummary",
                Node::record(vec![
                    ("PredictorNames", Node::cellstr(&["x1"])),
                    ("NumPredictors", Node::scalar(1.0)),
                ]),
            ),
            ("Impl", Node::record(vec![("Mu", Node::row(&[0.0]))])),
        ]),
    );
    let err = extract(writer).unwrap_err();
    assert_eq!(err.to_string(), "Field 'KernelParameters' not found in 'compactStruct.Impl'");
}

#[test]
fn untrained_standardization_passes_features_through() {
    let empty = Node::Double {
        dims: vec![0, 0],
        values: vec![],
    };
    let params = extract(MatWriter::new().variable(
        "compactStruct",
        compact_struct(Node::cellstr(&["x1", "x2"]), empty.clone(), empty),
    ))
    .unwrap();
    params.validate().unwrap();

    let x = ndarray::arr1(&[3.0f32, 4.0]);
    assert_eq!(standardize_features(x.view(), &params.mu, &params.sigma).unwrap(), x);
}

#[test]
fn standardizes_with_extracted_statistics() {
    let params = extract(model_writer()).unwrap();
    let z = standardize_features(ndarray::arr1(&[1.1f32, 1.2]).view(), &params.mu, &params.sigma).unwrap();
    assert!((z[0] - 1.0).abs() < 1e-6);
    assert!((z[1] - 2.0).abs() < 1e-6);
}

#[test]
fn validate_flags_inconsistent_shapes() {
    let mut params = extract(model_writer()).unwrap();
    params.alpha = ndarray::arr1(&[1.0f32]).into_dyn();
    assert!(matches!(params.validate(), Err(ModelError::Shape(_))));

    let mut params = extract(model_writer()).unwrap();
    params.mu = ndarray::arr1(&[1.0f32, 2.0, 3.0]).into_dyn();
    let err = params.validate().unwrap_err();
    assert!(err.to_string().contains("Mu"));
}

#[test]
fn serializes_to_json() {
    let params = extract(model_writer()).unwrap();
    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["predictor_names"], serde_json::json!(["x1", "x2"]));
    assert_eq!(json["support_vectors"]["shape"], serde_json::json!([3, 2]));
    assert_eq!(json["class_names"], serde_json::json!(["no", "yes"]));
}
