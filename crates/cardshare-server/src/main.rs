//! cardshare server binary.
//!
//! Reads `cardshare.toml` (or the path given with `--config`), overlays
//! `CARDSHARE_*` environment variables, and serves the JSON API. The `qr`
//! subcommand fetches a single QR code to disk and exits.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use cardshare_remote::QrEmitter;
use cardshare_server::{AppState, ServerConfig};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Digital business card server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cardshare.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Generate a QR code for TEXT and write it as PNG.
  Qr {
    text: String,
    /// Output file.
    #[arg(short, long)]
    out:  PathBuf,
    /// Edge length in pixels; defaults to `qr.size`.
    #[arg(long)]
    size: Option<u32>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let config = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(config).await,
    Command::Qr { text, out, size } => {
      let client = cardshare_remote::http_client(Duration::from_secs(config.qr.timeout_secs))
        .context("failed to build HTTP client")?;
      let qr = QrEmitter::standard(
        client,
        &config.qr.primary_endpoint,
        &config.qr.fallback_endpoint,
        config.qr.size,
      );
      qr.download(&text, &out, size.unwrap_or(config.qr.size))
        .await
        .with_context(|| format!("failed to write QR code to {out:?}"))?;
      println!("{}", out.display());
      Ok(())
    }
  }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
  let address = config.address();
  let state = AppState::open(config).await.context("failed to initialise application state")?;
  let app = cardshare_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
