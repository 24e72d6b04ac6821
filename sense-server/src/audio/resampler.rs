//! Analysis-rate conversion using rubato
//!
//! Feature extraction runs on a mono waveform at a fixed analysis rate.
//! Uploads arrive at whatever rate and channel layout the encoder chose, so
//! every clip is downmixed and resampled here first.

use crate::error::{Error, Result};
use rubato::{FastFixedIn, PolynomialDegree, Resampler as RubatoResampler};
use tracing::debug;

/// Canonical sample rate for feature extraction.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Downmix interleaved samples to mono by averaging channels.
pub fn downmix_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    let num_channels = channels.max(1) as usize;
    if num_channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(num_channels)
        .map(|frame| frame.iter().sum::<f32>() / num_channels as f32)
        .collect()
}

/// Resample a mono waveform to the analysis rate.
///
/// If the input is already at the analysis rate, it is returned unchanged.
pub fn to_analysis_rate(input: Vec<f32>, input_rate: u32) -> Result<Vec<f32>> {
    let output_rate = ANALYSIS_SAMPLE_RATE;

    if input_rate == output_rate {
        debug!("Sample rate already at {}Hz, skipping resample", output_rate);
        return Ok(input);
    }

    if input.is_empty() {
        return Err(Error::Feature("Cannot resample empty waveform".to_string()));
    }

    debug!("Resampling from {}Hz to {}Hz", input_rate, output_rate);

    let input_frames = input.len();
    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0, // ratio is fixed for the life of the resampler
        PolynomialDegree::Septic,
        input_frames,
        1,
    )
    .map_err(|e| Error::Feature(format!("Failed to create resampler: {}", e)))?;

    let output = resampler
        .process(&[input], None)
        .map_err(|e| Error::Feature(format!("Resampling failed: {}", e)))?;

    let mono = output
        .into_iter()
        .next()
        .ok_or_else(|| Error::Feature("Resampler produced no channels".to_string()))?;

    debug!(
        "Resampled {} input frames to {} output frames",
        input_frames,
        mono.len()
    );

    Ok(mono)
}
