//! REST API implementation for the prediction service

pub mod handlers;

use crate::audio::mfcc::MfccExtractor;
use crate::config::Settings;
use crate::model::{Classify, LabelSpace};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
///
/// Model, label table and feature extractor are built once at startup and
/// never mutated afterwards, so requests share them without locking at this
/// level.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classify>,
    pub labels: Arc<LabelSpace>,
    pub extractor: Arc<MfccExtractor>,
    pub settings: Settings,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness / diagnostics
        .route("/hello", get(handlers::hello))
        .route("/posttest", get(handlers::posttest))
        .route("/health", get(handlers::health))
        // Prediction routes; the wav/mp3 variants differ only in the
        // container hint passed to the decoder
        .route("/predict", post(handlers::predict))
        .route("/predict_wav", post(handlers::predict_wav))
        .route("/predict_mp3", post(handlers::predict_mp3))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
