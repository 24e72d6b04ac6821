//! API wire types shared between the prediction service and the test client

use serde::{Deserialize, Serialize};

/// Successful prediction response body
///
/// Returned by `POST /predict`, `POST /predict_wav` and `POST /predict_mp3`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Winning class label, decoded from the model's argmax output index
    pub predicted_class: String,
}

/// JSON error body returned on any failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
