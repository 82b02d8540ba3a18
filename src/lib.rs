//! Reads MATLAB Level 5 MAT-files and extracts the parameters of a polynomial
//! kernel SVM exported with `saveLearnerForCoder`.

pub mod cli;
pub mod mat;
pub mod model;
