/// Waveline Player - terminal playlist player with a frequency visualizer
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use waveline_audio_desktop::DesktopEngine;
use waveline_player::PlayerSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "waveline-player")]
#[command(about = "Playlist player with a real-time frequency visualizer", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./waveline.toml if present)
    #[arg(short, long, env = "WAVELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Manifest location, overriding the configured one
    #[arg(short, long)]
    manifest: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waveline_player=info,waveline_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = PlayerSettings::load_from(cli.config.as_deref())?;
    if let Some(manifest) = cli.manifest {
        settings.manifest.location = manifest;
    }

    tracing::info!("Starting Waveline Player");
    tracing::info!("Manifest: {}", settings.manifest.location);

    let engine = DesktopEngine::new().context("Failed to open audio output")?;
    tracing::info!("Audio output at {} Hz", engine.sample_rate());

    waveline_player::run(engine, settings).await
}
