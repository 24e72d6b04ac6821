//! Sense prediction service - main entry point
//!
//! Loads the classifier and label table once, binds the HTTP server, and
//! serves prediction requests until shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sense_server::api::{self, AppState};
use sense_server::audio::mfcc::MfccExtractor;
use sense_server::config::{Settings, TomlConfig};
use sense_server::model::{LabelSpace, OnnxClassifier};

/// Command-line arguments for sense-server
#[derive(Parser, Debug)]
#[command(name = "sense-server")]
#[command(about = "HTTP inference service for environmental-sound classification")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SENSE_PORT")]
    port: Option<u16>,

    /// Path to the serialized ONNX classifier
    #[arg(short, long, env = "SENSE_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Path to the reference CSV providing the class-label column
    #[arg(short, long, env = "SENSE_LABELS_PATH")]
    labels: Option<PathBuf>,

    /// Directory for uploaded temp files
    #[arg(long, env = "SENSE_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Truncate uploads to the first N seconds before feature extraction
    #[arg(long, env = "SENSE_CLIP_SECONDS")]
    clip_seconds: Option<f32>,

    /// Path to the TOML config file (default: platform config dir)
    #[arg(short, long, env = "SENSE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sense_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let toml_config =
        TomlConfig::load(args.config.as_deref()).context("Failed to load config file")?;
    let settings = Settings::resolve(
        toml_config,
        args.port,
        args.model,
        args.labels,
        args.upload_dir,
        args.clip_seconds,
    )
    .context("Invalid settings")?;

    info!("Starting Sense prediction service on port {}", settings.port);

    // Load serving artifacts once; a bad model or label table fails startup,
    // not the first unlucky request.
    let labels = Arc::new(
        LabelSpace::from_csv(&settings.labels_path).context("Failed to load label table")?,
    );
    let classifier = Arc::new(
        OnnxClassifier::load(&settings.model_path).context("Failed to load classifier")?,
    );
    let extractor = Arc::new(MfccExtractor::default());

    info!("Serving {} classes: {:?}", labels.len(), labels.labels());

    let app_state = AppState {
        classifier,
        labels,
        extractor,
        settings: settings.clone(),
    };

    let app = api::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
