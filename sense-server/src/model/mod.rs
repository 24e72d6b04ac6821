//! Trained-model artifacts: label space and classifier

pub mod classifier;
pub mod labels;

pub use classifier::{argmax, Classify, OnnxClassifier};
pub use labels::LabelSpace;
