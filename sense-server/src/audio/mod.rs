//! Audio decoding, resampling and feature extraction

pub mod decoder;
pub mod encode;
pub mod mfcc;
pub mod resampler;
