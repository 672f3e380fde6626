//! Dispatch of submissions to the configured chat.
//!
//! A dispatch is strictly sequential:
//! store temp file (if any) → send text → send document/photo (if any) →
//! delete temp file.

use crate::config::Config;
use crate::error::{DispatchError, Error, Result};
use crate::types::{AttachmentKind, Delivery, DispatchReport, LegOutcome, Submission};
use std::path::PathBuf;
use std::sync::Arc;

pub mod messenger;
pub mod temp;

pub use messenger::{Messenger, OutgoingFile, TelegramClient};
pub use temp::TempUpload;

/// Relays submissions through a [`Messenger`]
#[derive(Clone)]
pub struct Relay {
    messenger: Arc<dyn Messenger>,
    upload_dir: PathBuf,
}

impl Relay {
    /// Create a relay that talks to the Telegram Bot API described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let client = TelegramClient::new(&config.telegram)?;
        Ok(Self::with_messenger(
            Arc::new(client),
            config.upload.upload_dir.clone(),
        ))
    }

    /// Create a relay over any messenger implementation
    pub fn with_messenger(messenger: Arc<dyn Messenger>, upload_dir: PathBuf) -> Self {
        Self {
            messenger,
            upload_dir,
        }
    }

    /// Whether a chat destination is configured
    pub fn is_configured(&self) -> bool {
        self.messenger.is_configured()
    }

    /// Relay one submission to the chat.
    ///
    /// Succeeds when the text or the attachment reached the chat; the
    /// returned report records the outcome of each send. The temporary copy
    /// of the attachment is removed before returning, whatever the outcome.
    pub async fn dispatch(&self, submission: Submission) -> Result<DispatchReport> {
        if !self.messenger.is_configured() {
            tracing::warn!("dropping submission: BOT_TOKEN or CHAT_ID not set");
            return Err(DispatchError::NotConfigured.into());
        }

        let stored = match &submission.attachment {
            Some(attachment) => {
                let upload = TempUpload::write(&self.upload_dir, &attachment.bytes)
                    .await
                    .map_err(Error::Io)?;
                Some((attachment, upload))
            }
            None => None,
        };

        let message = outcome(
            "message",
            self.messenger.send_message(&submission.text).await,
        );

        let attachment = match stored {
            Some((attachment, upload)) => {
                let file = OutgoingFile {
                    path: upload.path(),
                    file_name: &attachment.file_name,
                };
                tracing::info!(
                    file_name = %attachment.file_name,
                    content_type = %attachment.content_type,
                    size = attachment.size(),
                    kind = ?attachment.kind,
                    "sending attachment"
                );
                let result = match attachment.kind {
                    AttachmentKind::Photo => {
                        self.messenger.send_photo(file, &submission.caption).await
                    }
                    AttachmentKind::Document => {
                        self.messenger
                            .send_document(file, &submission.caption)
                            .await
                    }
                };
                upload.remove();
                Some(outcome("attachment", result))
            }
            None => None,
        };

        let report = DispatchReport {
            message,
            attachment,
        };

        let delivered = report.message.is_sent()
            || report.attachment.as_ref().is_some_and(LegOutcome::is_sent);
        if delivered {
            if !report.is_complete() {
                tracing::warn!(?report, "submission only partly delivered");
            }
            Ok(report)
        } else {
            let error = report
                .message
                .error()
                .or_else(|| report.attachment.as_ref().and_then(LegOutcome::error))
                .unwrap_or("unknown error")
                .to_string();
            Err(DispatchError::Failed(error).into())
        }
    }
}

fn outcome(leg: &'static str, result: std::result::Result<Delivery, DispatchError>) -> LegOutcome {
    match result {
        Ok(Delivery { message_id }) => {
            tracing::info!(leg, ?message_id, "delivered to chat");
            LegOutcome::Sent { message_id }
        }
        Err(e) => {
            tracing::error!(leg, error = %e, "send failed");
            LegOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
