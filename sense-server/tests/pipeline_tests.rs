//! End-to-end tests for the prediction pipeline below the HTTP layer
//!
//! Generates real WAV fixtures with hound and runs them through decode,
//! resample, MFCC extraction and (stubbed) classification.

use ndarray::Array2;
use std::path::Path;
use tempfile::NamedTempFile;

use sense_server::audio::mfcc::{MfccExtractor, NUM_COEFFICIENTS, TARGET_FRAMES};
use sense_server::model::{Classify, LabelSpace};
use sense_server::predict::classify_clip;
use sense_server::{Error, Result};

struct StubClassifier {
    scores: Vec<f32>,
}

impl Classify for StubClassifier {
    fn scores(&self, features: &Array2<f32>) -> Result<Vec<f32>> {
        assert_eq!(features.shape(), &[NUM_COEFFICIENTS, TARGET_FRAMES]);
        Ok(self.scores.clone())
    }
}

fn reference_labels() -> LabelSpace {
    LabelSpace::from_labels(vec![
        "dog_bark".to_string(),
        "siren".to_string(),
        "car_horn".to_string(),
    ])
    .unwrap()
}

/// Write a mono sine WAV fixture and return the temp file handle.
fn wav_fixture(seconds: f32, sample_rate: u32) -> NamedTempFile {
    let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
    let n = (seconds * sample_rate as f32) as usize;
    for i in 0..n {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        writer
            .write_sample((sample * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
    file
}

#[test]
fn classifies_generated_wav_to_a_known_label() {
    let fixture = wav_fixture(2.0, 44_100);
    let extractor = MfccExtractor::default();
    let classifier = StubClassifier {
        scores: vec![0.1, 0.2, 0.7],
    };
    let labels = reference_labels();

    let label = classify_clip(
        fixture.path(),
        Some("wav"),
        None,
        &extractor,
        &classifier,
        &labels,
    )
    .unwrap();

    // argmax index 2 = "siren" after lexicographic encoding
    assert_eq!(label, "siren");
    assert!(["car_horn", "dog_bark", "siren"].contains(&label.as_str()));
}

#[test]
fn clip_truncation_still_yields_a_prediction() {
    // 10 seconds in, 4-second truncation configured
    let fixture = wav_fixture(10.0, 44_100);
    let extractor = MfccExtractor::default();
    let classifier = StubClassifier {
        scores: vec![0.9, 0.05, 0.05],
    };
    let labels = reference_labels();

    let label = classify_clip(
        fixture.path(),
        Some("wav"),
        Some(4.0),
        &extractor,
        &classifier,
        &labels,
    )
    .unwrap();

    assert_eq!(label, "car_horn");
}

#[test]
fn prediction_is_deterministic_for_fixed_input() {
    let fixture = wav_fixture(1.0, 48_000);
    let extractor = MfccExtractor::default();
    let labels = reference_labels();
    let classifier = StubClassifier {
        scores: vec![0.0, 1.0, 0.0],
    };

    let a = classify_clip(fixture.path(), None, None, &extractor, &classifier, &labels).unwrap();
    let b = classify_clip(fixture.path(), None, None, &extractor, &classifier, &labels).unwrap();
    assert_eq!(a, b);
}

#[test]
fn score_label_cardinality_mismatch_is_rejected() {
    let fixture = wav_fixture(1.0, 44_100);
    let extractor = MfccExtractor::default();
    // Four scores against a three-class table
    let classifier = StubClassifier {
        scores: vec![0.25, 0.25, 0.25, 0.25],
    };
    let labels = reference_labels();

    let result = classify_clip(
        fixture.path(),
        Some("wav"),
        None,
        &extractor,
        &classifier,
        &labels,
    );
    assert!(matches!(result, Err(Error::Model(_))));
}

#[test]
fn unreadable_file_fails_with_decode_error() {
    let extractor = MfccExtractor::default();
    let classifier = StubClassifier {
        scores: vec![1.0, 0.0, 0.0],
    };
    let labels = reference_labels();

    let result = classify_clip(
        Path::new("/nonexistent/clip.wav"),
        Some("wav"),
        None,
        &extractor,
        &classifier,
        &labels,
    );
    assert!(matches!(result, Err(Error::Decode(_))));
}
