//! MFCC feature extraction
//!
//! Computes a fixed-shape Mel-frequency cepstral coefficient matrix from a
//! mono waveform at the analysis rate. The pipeline is the standard one:
//! centered STFT (reflect padding, Hann window), power spectrum, triangular
//! mel filterbank, log compression, orthonormal DCT-II.
//!
//! Output shape is always (`NUM_COEFFICIENTS`, `TARGET_FRAMES`): shorter
//! clips are zero-padded on the right along the time axis, longer clips are
//! truncated. The classifier's input layer depends on this shape.

use crate::error::{Error, Result};
use ndarray::Array2;
use realfft::{RealFftPlanner, RealToComplex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Number of cepstral coefficients per frame.
pub const NUM_COEFFICIENTS: usize = 40;

/// Canonical time-axis width of the feature matrix.
pub const TARGET_FRAMES: usize = 174;

/// STFT and filterbank parameters.
#[derive(Debug, Clone)]
pub struct MfccConfig {
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    pub n_mfcc: usize,
    pub target_frames: usize,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::audio::resampler::ANALYSIS_SAMPLE_RATE,
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            n_mfcc: NUM_COEFFICIENTS,
            target_frames: TARGET_FRAMES,
        }
    }
}

/// MFCC extractor with precomputed FFT plan, window, filterbank and DCT basis.
///
/// Built once at startup and shared across requests; extraction itself is
/// deterministic for fixed input.
pub struct MfccExtractor {
    cfg: MfccConfig,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    mel_bank: Vec<Vec<f32>>,
    dct_basis: Vec<Vec<f32>>,
}

impl MfccExtractor {
    pub fn new(cfg: MfccConfig) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(cfg.n_fft);
        let window = hann_window(cfg.n_fft);
        let mel_bank = mel_filter_bank(cfg.n_mels, cfg.n_fft, cfg.sample_rate);
        let dct_basis = dct_ii_basis(cfg.n_mfcc, cfg.n_mels);
        Self {
            cfg,
            fft,
            window,
            mel_bank,
            dct_basis,
        }
    }

    /// Extract the MFCC matrix from a mono waveform at the analysis rate.
    ///
    /// Returns a matrix of shape (`n_mfcc`, `target_frames`).
    pub fn extract(&self, samples: &[f32]) -> Result<Array2<f32>> {
        if samples.is_empty() {
            return Err(Error::Feature("Empty waveform".to_string()));
        }

        let cfg = &self.cfg;
        let half_fft = cfg.n_fft / 2 + 1;
        let pad = cfg.n_fft / 2;

        // Centered framing: frame t is windowed around sample t * hop_length,
        // with the waveform reflect-padded by n_fft/2 on both sides.
        let num_frames = samples.len() / cfg.hop_length + 1;

        let mut mel_spec = vec![vec![0.0f32; num_frames]; cfg.n_mels];
        let mut frame = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();
        let mut power = vec![0.0f32; half_fft];

        for t in 0..num_frames {
            let start = t as isize * cfg.hop_length as isize - pad as isize;
            for (i, slot) in frame.iter_mut().enumerate() {
                let src = reflect_index(start + i as isize, samples.len());
                *slot = samples[src] * self.window[i];
            }

            self.fft
                .process(&mut frame, &mut spectrum)
                .map_err(|e| Error::Feature(format!("FFT failed: {}", e)))?;

            for (p, c) in power.iter_mut().zip(spectrum.iter()) {
                *p = c.re * c.re + c.im * c.im;
            }

            for (m, filter) in self.mel_bank.iter().enumerate() {
                let energy: f32 = filter
                    .iter()
                    .zip(power.iter())
                    .map(|(&w, &p)| w * p)
                    .sum();
                mel_spec[m][t] = energy;
            }
        }

        log_compress(&mut mel_spec);

        // DCT-II along the mel axis, keeping the first n_mfcc coefficients,
        // written straight into the fixed-width output. Frames beyond
        // target_frames are dropped; missing frames stay zero.
        let mut mfcc = Array2::<f32>::zeros((cfg.n_mfcc, cfg.target_frames));
        let copy_frames = num_frames.min(cfg.target_frames);
        for t in 0..copy_frames {
            for (k, basis) in self.dct_basis.iter().enumerate() {
                let mut acc = 0.0f32;
                for (m, &b) in basis.iter().enumerate() {
                    acc += b * mel_spec[m][t];
                }
                mfcc[[k, t]] = acc;
            }
        }

        Ok(mfcc)
    }
}

impl Default for MfccExtractor {
    fn default() -> Self {
        Self::new(MfccConfig::default())
    }
}

/// Periodic Hann window.
fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos()))
        .collect()
}

/// Fold an out-of-range index back into `0..n` by reflection about the
/// signal edges (no edge duplication).
fn reflect_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut k = i.rem_euclid(period);
    if k >= n as isize {
        k = period - k;
    }
    k as usize
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank over `0..sample_rate/2`.
///
/// Returns `[n_mels][n_fft/2 + 1]`. Filter weights are computed in
/// continuous frequency space against the FFT bin center frequencies.
fn mel_filter_bank(n_mels: usize, n_fft: usize, sample_rate: u32) -> Vec<Vec<f32>> {
    let half_fft = n_fft / 2 + 1;
    let f_max = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(f_max);

    // n_mels + 2 equally spaced mel points define the triangle edges
    let edges: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let bin_hz = sample_rate as f32 / n_fft as f32;

    let mut bank = Vec::with_capacity(n_mels);
    for m in 0..n_mels {
        let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
        let mut filter = vec![0.0f32; half_fft];
        for (k, w) in filter.iter_mut().enumerate() {
            let f = k as f32 * bin_hz;
            let rising = if center > left {
                (f - left) / (center - left)
            } else {
                0.0
            };
            let falling = if right > center {
                (right - f) / (right - center)
            } else {
                0.0
            };
            *w = rising.min(falling).max(0.0);
        }
        bank.push(filter);
    }
    bank
}

/// Orthonormal DCT-II basis, `[n_mfcc][n_mels]`.
fn dct_ii_basis(n_mfcc: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let mut basis = Vec::with_capacity(n_mfcc);
    for k in 0..n_mfcc {
        let scale = if k == 0 {
            (1.0 / n_mels as f32).sqrt()
        } else {
            (2.0 / n_mels as f32).sqrt()
        };
        let row: Vec<f32> = (0..n_mels)
            .map(|m| scale * (PI * k as f32 * (2.0 * m as f32 + 1.0) / (2.0 * n_mels as f32)).cos())
            .collect();
        basis.push(row);
    }
    basis
}

/// Convert mel energies to dB in place, with a floor 80 dB below the peak.
fn log_compress(mel_spec: &mut [Vec<f32>]) {
    const AMIN: f32 = 1e-10;
    const TOP_DB: f32 = 80.0;

    let mut max_db = f32::MIN;
    for row in mel_spec.iter_mut() {
        for v in row.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10();
            if *v > max_db {
                max_db = *v;
            }
        }
    }

    let floor = max_db - TOP_DB;
    for row in mel_spec.iter_mut() {
        for v in row.iter_mut() {
            if *v < floor {
                *v = floor;
            }
        }
    }
}
