//! Test client: POST a sample clip to the prediction service
//!
//! One-shot manual check against a running server. Defaults post the bundled
//! dog-bark fixture to the MP3 route on localhost.

use anyhow::{Context, Result};
use clap::Parser;
use sense_common::api::{ErrorResponse, PredictionResponse};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "post-sample")]
#[command(about = "Post a sample audio file to the Sense prediction service")]
struct Args {
    /// Prediction endpoint URL
    #[arg(short, long, default_value = "http://127.0.0.1:5000/predict_mp3")]
    url: String,

    /// Audio file to submit
    #[arg(short, long, default_value = "test_audio/dog_bark_1_mp3.mp3")]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "sample".to_string());

    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = reqwest::Client::new()
        .post(&args.url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("Failed to POST to {}", args.url))?;

    if response.status().is_success() {
        let data: PredictionResponse = response
            .json()
            .await
            .context("Response was not valid prediction JSON")?;
        println!("Predicted class: {}", data.predicted_class);
    } else {
        let status = response.status();
        let body: ErrorResponse = response
            .json()
            .await
            .unwrap_or_else(|_| ErrorResponse {
                error: "<no error body>".to_string(),
            });
        anyhow::bail!("Server returned {}: {}", status, body.error);
    }

    Ok(())
}
