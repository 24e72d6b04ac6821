//! HTTP request handlers
//!
//! Implements the prediction endpoints plus the liveness and diagnostic
//! routes. Per-request flow: receive multipart upload → persist to a scoped
//! temp file → run the blocking prediction pipeline off the async runtime →
//! respond with JSON. The temp file is deleted when the guard drops, on
//! success and failure alike.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::ingest::UploadedClip;
use crate::predict;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, Method};
use axum::response::Html;
use axum::Json;
use sense_common::api::PredictionResponse;
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    classes: usize,
}

/// GET /hello - liveness check
pub async fn hello() -> Html<&'static str> {
    Html("<h1 style='color:blue'>Hello There!</h1>")
}

/// GET /posttest - diagnostic echo of request metadata
///
/// Logs the incoming request's method and headers server-side; the body of
/// the response itself is static.
pub async fn posttest(method: Method, headers: HeaderMap) -> Html<&'static str> {
    debug!("posttest: method={}", method);
    for (name, value) in headers.iter() {
        debug!("posttest: header {}: {:?}", name, value);
    }
    Html("<h1 style='color:green'>Hello There!</h1>")
}

/// GET /health - health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "sense-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classes: state.labels.len(),
    })
}

/// POST /predict - classify an uploaded clip, format probed from content
pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>> {
    run_prediction(state, multipart, None).await
}

/// POST /predict_wav - classify an uploaded WAV clip
pub async fn predict_wav(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>> {
    run_prediction(state, multipart, Some("wav")).await
}

/// POST /predict_mp3 - classify an uploaded MP3 clip
pub async fn predict_mp3(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>> {
    run_prediction(state, multipart, Some("mp3")).await
}

/// Shared prediction flow for all three routes.
async fn run_prediction(
    state: AppState,
    multipart: Multipart,
    extension_hint: Option<&'static str>,
) -> Result<Json<PredictionResponse>> {
    let bytes = read_file_field(multipart).await?;
    info!(
        "Received {} byte upload (hint: {})",
        bytes.len(),
        extension_hint.unwrap_or("none")
    );

    let clip = UploadedClip::write(&bytes, &state.settings.upload_dir, extension_hint)?;

    let clip_seconds = state.settings.clip_seconds;
    let classifier = state.classifier.clone();
    let labels = state.labels.clone();
    let extractor = state.extractor.clone();

    // Decode, feature extraction and inference are CPU-bound; keep them off
    // the async worker threads. The clip guard moves into the closure and is
    // dropped (deleting the file) when the pipeline finishes either way.
    let predicted_class = tokio::task::spawn_blocking(move || {
        predict::classify_clip(
            clip.path(),
            extension_hint,
            clip_seconds,
            &extractor,
            classifier.as_ref(),
            &labels,
        )
    })
    .await
    .map_err(|e| Error::Internal(format!("Prediction task failed: {}", e)))?
    .map_err(|e| {
        error!("Prediction failed: {}", e);
        e
    })?;

    Ok(Json(PredictionResponse { predicted_class }))
}

/// Pull the bytes of the multipart field named `file`.
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(Error::BadRequest(
        "Missing multipart field 'file'".to_string(),
    ))
}
