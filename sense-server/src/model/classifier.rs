//! Pre-trained classifier inference via ONNX Runtime
//!
//! The session is built once at startup and shared for the life of the
//! process; a missing or malformed model file fails service startup rather
//! than individual requests. `Classify` is the seam the HTTP layer depends
//! on, so tests can drive the full request pipeline without a model file.

use crate::audio::mfcc::{NUM_COEFFICIENTS, TARGET_FRAMES};
use crate::error::{Error, Result};
use ndarray::{Array2, Axis};
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Maps a feature matrix to per-class activation scores.
pub trait Classify: Send + Sync {
    /// Run a forward pass over a (40, 174) feature matrix and return one
    /// score per class.
    fn scores(&self, features: &Array2<f32>) -> Result<Vec<f32>>;
}

/// Index of the maximum activation, i.e. the hard-label decoding.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

/// ONNX Runtime-backed classifier.
///
/// `Session::run` takes `&mut self`, so the session sits behind a mutex;
/// requests serialize on inference, which is the dominant cost anyway.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    /// Load the serialized model from disk and prepare a session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Model(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|b| Ok(b.with_intra_threads(1)?))
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| Error::Model(format!("Failed to load {}: {}", path.display(), e)))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| Error::Model("Model has no inputs".to_string()))?;

        info!(
            "Loaded classifier from {} (input '{}')",
            path.display(),
            input_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Classify for OnnxClassifier {
    fn scores(&self, features: &Array2<f32>) -> Result<Vec<f32>> {
        if features.shape() != [NUM_COEFFICIENTS, TARGET_FRAMES] {
            return Err(Error::Model(format!(
                "Feature matrix has shape {:?}, expected [{}, {}]",
                features.shape(),
                NUM_COEFFICIENTS,
                TARGET_FRAMES
            )));
        }

        // Model input layout: [batch=1, rows, columns, channels=1]
        let input = features
            .to_owned()
            .insert_axis(Axis(0))
            .insert_axis(Axis(3));

        let input_tensor = Tensor::from_array(input)
            .map_err(|e| Error::Model(format!("Tensor creation failed: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| Error::Internal("Classifier mutex poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| Error::Model(format!("Inference failed: {}", e)))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| Error::Model("Model produced no output".to_string()))?;

        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Model(format!("Output extraction failed: {}", e)))?;

        Ok(data.to_vec())
    }
}
