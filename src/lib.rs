//! # report-relay
//!
//! Web form that relays shift reports, with an optional attachment, to a
//! Telegram chat.
//!
//! A submission flows through the crate strictly in order:
//! validate → store temp file (if any) → send text → send photo/document
//! (if any) → delete temp file → respond.
//!
//! ## Quick Start
//!
//! ```no_run
//! use report_relay::{Config, Relay};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // BOT_TOKEN, CHAT_ID, MAX_CONTENT_LENGTH_MB, ... from the environment or .env
//!     let config = Arc::new(Config::from_env(None)?);
//!     let relay = Arc::new(Relay::new(&config)?);
//!
//!     report_relay::api::start_api_server(relay, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP form server
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Dispatch to the chat, temporary upload storage
pub mod relay;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, DispatchError, Error, ErrorDetail, Result, SubmissionError, ToHttpStatus};
pub use relay::{Messenger, Relay, TelegramClient};
pub use types::{Attachment, AttachmentKind, DispatchReport, LegOutcome, ReportFields, Submission};

/// Resolves when the process is asked to stop.
///
/// - **Unix:** SIGTERM or SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("Shutting down");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
