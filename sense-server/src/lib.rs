//! # Sense Prediction Service Library
//!
//! HTTP inference service for environmental-sound classification.
//!
//! **Purpose:** Accept an uploaded audio clip (WAV or MP3), extract a
//! fixed-shape MFCC feature matrix, run it through a pre-trained
//! convolutional classifier, and return the predicted class label as JSON.
//!
//! **Architecture:** axum HTTP layer over a synchronous pipeline of
//! symphonia (decode), rubato (resample), realfft (STFT) and ONNX Runtime
//! (inference). Model and label table load once at startup into immutable
//! shared state.

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod predict;

pub use error::{Error, Result};
