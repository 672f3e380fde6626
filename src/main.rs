//! report-relay server binary

use clap::Parser;
use report_relay::{Config, Relay};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "report-relay")]
#[command(about = "Web form that relays shift reports and attachments to a Telegram chat")]
#[command(version)]
struct Cli {
    /// Env file to load instead of ./.env
    #[arg(short, long, env = "REPORT_RELAY_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Listen address, overrides HOST and PORT
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = Config::from_env(cli.env_file.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    tokio::fs::create_dir_all(&config.upload.upload_dir).await?;

    if !config.telegram.is_configured() {
        tracing::warn!("BOT_TOKEN or CHAT_ID not set, submissions will be rejected");
    }
    tracing::info!(
        upload_dir = %config.upload.upload_dir.display(),
        max_upload_bytes = config.upload.max_upload_bytes,
        allowed = ?config.upload.allowed_extensions,
        "upload limits"
    );

    let relay = Arc::new(Relay::new(&config)?);
    report_relay::api::start_api_server(relay, Arc::new(config)).await?;

    Ok(())
}
