//! The per-request prediction pipeline
//!
//! decode → downmix/resample → (optional clip truncation) → MFCC →
//! classifier scores → argmax → label. Pure and synchronous; the HTTP layer
//! runs it under `spawn_blocking`.

use crate::audio::mfcc::MfccExtractor;
use crate::audio::{decoder, resampler};
use crate::error::{Error, Result};
use crate::model::{argmax, Classify, LabelSpace};
use std::path::Path;
use tracing::{debug, info};

/// Classify the audio clip at `path` and return the winning label.
///
/// `clip_seconds`, when set, truncates the waveform to its first N seconds
/// before feature extraction (short-clip optimization, off by default).
pub fn classify_clip(
    path: &Path,
    extension_hint: Option<&str>,
    clip_seconds: Option<f32>,
    extractor: &MfccExtractor,
    classifier: &dyn Classify,
    labels: &LabelSpace,
) -> Result<String> {
    let decoded = decoder::decode_file(path, extension_hint)?;
    debug!(
        "Decoded clip: {:.2}s at {}Hz, {} channel(s)",
        decoded.duration_seconds(),
        decoded.sample_rate,
        decoded.channels
    );

    let mono = resampler::downmix_mono(&decoded.samples, decoded.channels);
    let mut waveform = resampler::to_analysis_rate(mono, decoded.sample_rate)?;

    if let Some(seconds) = clip_seconds {
        let max_samples = (seconds * resampler::ANALYSIS_SAMPLE_RATE as f32) as usize;
        if waveform.len() > max_samples {
            debug!("Truncating waveform to first {:.1}s", seconds);
            waveform.truncate(max_samples);
        }
    }

    let features = extractor.extract(&waveform)?;
    let scores = classifier.scores(&features)?;

    if scores.len() != labels.len() {
        return Err(Error::Model(format!(
            "Model emitted {} scores but the label table has {} classes",
            scores.len(),
            labels.len()
        )));
    }

    let winner = argmax(&scores)
        .ok_or_else(|| Error::Model("Model emitted no scores".to_string()))?;
    let label = labels.decode(winner)?;

    info!("Predicted class: {}", label);
    Ok(label.to_string())
}
