//! PCM encoding back into WAV and MP3 containers
//!
//! The inverse of the decode path, used by the `convert-audio` binary and by
//! tests that need compressed fixtures without shipping binary files.

use crate::audio::decoder::DecodedAudio;
use crate::error::{Error, Result};
use mp3lame_encoder::{Birtate, FlushNoGap, InterleavedPcm, MonoPcm, Quality};
use std::io::Cursor;

/// Convert f32 samples in [-1, 1] to 16-bit PCM.
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Encode PCM as a 16-bit WAV stream in memory.
pub fn wav_bytes(audio: &DecodedAudio) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)
            .map_err(|e| Error::Encode(format!("Failed to create WAV writer: {}", e)))?;
        for sample in to_i16(&audio.samples) {
            writer
                .write_sample(sample)
                .map_err(|e| Error::Encode(format!("WAV write failed: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| Error::Encode(format!("WAV finalize failed: {}", e)))?;
    }
    Ok(buffer.into_inner())
}

/// Encode PCM as an MP3 stream in memory (mono or stereo).
pub fn mp3_bytes(audio: &DecodedAudio) -> Result<Vec<u8>> {
    if audio.channels == 0 || audio.channels > 2 {
        return Err(Error::Encode(
            "MP3 output supports mono or stereo only".to_string(),
        ));
    }

    let mut builder = mp3lame_encoder::Builder::new()
        .ok_or_else(|| Error::Encode("Failed to create LAME builder".to_string()))?;
    builder
        .set_num_channels(audio.channels as u8)
        .map_err(|e| Error::Encode(format!("set_num_channels: {:?}", e)))?;
    builder
        .set_sample_rate(audio.sample_rate)
        .map_err(|e| Error::Encode(format!("set_sample_rate: {:?}", e)))?;
    builder
        .set_brate(Birtate::Kbps192)
        .map_err(|e| Error::Encode(format!("set_brate: {:?}", e)))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| Error::Encode(format!("set_quality: {:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| Error::Encode(format!("Failed to initialize LAME encoder: {:?}", e)))?;

    let pcm = to_i16(&audio.samples);
    let frames = pcm.len() / audio.channels as usize;

    let mut out: Vec<u8> = Vec::new();
    out.reserve(mp3lame_encoder::max_required_buffer_size(frames));

    let written = if audio.channels == 1 {
        encoder
            .encode(MonoPcm(&pcm), out.spare_capacity_mut())
            .map_err(|e| Error::Encode(format!("MP3 encode failed: {:?}", e)))?
    } else {
        encoder
            .encode(InterleavedPcm(&pcm), out.spare_capacity_mut())
            .map_err(|e| Error::Encode(format!("MP3 encode failed: {:?}", e)))?
    };
    // SAFETY: the encoder reports how many bytes of spare capacity it filled
    unsafe { out.set_len(out.len() + written) };

    let written = encoder
        .flush::<FlushNoGap>(out.spare_capacity_mut())
        .map_err(|e| Error::Encode(format!("MP3 flush failed: {:?}", e)))?;
    // SAFETY: as above
    unsafe { out.set_len(out.len() + written) };

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decoder;
    use std::io::Write;

    fn sine_clip() -> DecodedAudio {
        let sample_rate = 44_100;
        let samples: Vec<f32> = (0..sample_rate)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
            })
            .collect();
        DecodedAudio {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    #[test]
    fn to_i16_clamps_out_of_range_samples() {
        let pcm = to_i16(&[0.0, 1.0, -1.0, 2.0, -2.0]);
        assert_eq!(pcm[0], 0);
        assert_eq!(pcm[1], i16::MAX);
        assert_eq!(pcm[3], i16::MAX);
        assert_eq!(pcm[4], -i16::MAX);
    }

    #[test]
    fn wav_bytes_round_trip_through_decoder() {
        let clip = sine_clip();
        let bytes = wav_bytes(&clip).unwrap();

        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let decoded = decoder::decode_file(file.path(), Some("wav")).unwrap();
        assert_eq!(decoded.sample_rate, clip.sample_rate);
        assert_eq!(decoded.channels, clip.channels);
        assert_eq!(decoded.samples.len(), clip.samples.len());
    }

    #[test]
    fn mp3_bytes_produces_a_decodable_stream() {
        let clip = sine_clip();
        let bytes = mp3_bytes(&clip).unwrap();
        assert!(!bytes.is_empty());

        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let decoded = decoder::decode_file(file.path(), Some("mp3")).unwrap();
        assert_eq!(decoded.sample_rate, clip.sample_rate);
        assert_eq!(decoded.channels, clip.channels);
        // MP3 framing adds encoder delay; duration should still be close
        assert!((decoded.duration_seconds() - 1.0).abs() < 0.2);
    }

    #[test]
    fn too_many_channels_are_rejected() {
        let clip = DecodedAudio {
            samples: vec![0.0; 300],
            sample_rate: 44_100,
            channels: 3,
        };
        assert!(matches!(mp3_bytes(&clip), Err(Error::Encode(_))));
    }
}
