//! Format converter: transcode an audio file between WAV and MP3
//!
//! Used to generate test fixtures (e.g. turn a WAV clip into the MP3 posted
//! by the test client). Output format is inferred from the destination
//! extension. Decoding goes through the same symphonia path the server uses.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use sense_server::audio::{decoder, encode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "convert-audio")]
#[command(about = "Convert an audio file between WAV and MP3")]
struct Args {
    /// Source audio file (WAV or MP3)
    #[arg(default_value = "test_audio/dog_bark_1.wav")]
    src: PathBuf,

    /// Destination file; format inferred from extension (.wav or .mp3)
    #[arg(default_value = "test_audio/dog_bark_1_mp3.mp3")]
    dst: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let decoded = decoder::decode_file(&args.src, None)
        .map_err(|e| anyhow!("Failed to decode {}: {}", args.src.display(), e))?;

    let ext = args
        .dst
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let bytes = match ext.as_str() {
        "wav" => encode::wav_bytes(&decoded)?,
        "mp3" => encode::mp3_bytes(&decoded)?,
        other => bail!("Unsupported destination format: '{}'", other),
    };
    std::fs::write(&args.dst, &bytes)
        .with_context(|| format!("Failed to write {}", args.dst.display()))?;

    println!(
        "Converted {} -> {} ({:.2}s)",
        args.src.display(),
        args.dst.display(),
        decoded.duration_seconds()
    );
    Ok(())
}
