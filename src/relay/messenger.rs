//! Outbound messaging: the [`Messenger`] seam and its Telegram bot client.

use crate::config::TelegramConfig;
use crate::error::{DispatchError, Error, Result};
use crate::types::Delivery;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Recipient};

/// A file to upload alongside a caption
#[derive(Clone, Copy, Debug)]
pub struct OutgoingFile<'a> {
    /// File on disk to read the contents from
    pub path: &'a Path,
    /// Name shown in the chat
    pub file_name: &'a str,
}

/// Sends messages to the configured chat.
///
/// Implemented by [`TelegramClient`]; tests substitute their own.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Whether a destination is configured at all
    fn is_configured(&self) -> bool;

    /// Send a plain text message
    async fn send_message(&self, text: &str) -> std::result::Result<Delivery, DispatchError>;

    /// Send a file as a generic document
    async fn send_document(
        &self,
        file: OutgoingFile<'_>,
        caption: &str,
    ) -> std::result::Result<Delivery, DispatchError>;

    /// Send an image as a photo, so the chat shows a preview
    async fn send_photo(
        &self,
        file: OutgoingFile<'_>,
        caption: &str,
    ) -> std::result::Result<Delivery, DispatchError>;
}

/// Telegram bot bound to a single chat
#[derive(Clone)]
pub struct TelegramClient {
    bot: Option<Bot>,
    chat: Option<Recipient>,
}

impl TelegramClient {
    /// Build a client from configuration.
    ///
    /// Missing credentials are not an error here; every send fails with
    /// [`DispatchError::NotConfigured`] instead.
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let api_url = api_url(&config.api_base_url)?;

        let bot = match config.bot_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                let http = reqwest::Client::builder()
                    .timeout(config.request_timeout)
                    .build()?;
                Some(Bot::with_client(token, http).set_api_url(api_url))
            }
            _ => None,
        };
        let chat = config
            .chat_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(recipient);

        Ok(Self { bot, chat })
    }

    fn destination(&self) -> std::result::Result<(&Bot, Recipient), DispatchError> {
        match (&self.bot, &self.chat) {
            (Some(bot), Some(chat)) => Ok((bot, chat.clone())),
            _ => Err(DispatchError::NotConfigured),
        }
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("bot_token", &self.bot.as_ref().map(|_| "<redacted>"))
            .field("chat", &self.chat)
            .finish()
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    fn is_configured(&self) -> bool {
        self.destination().is_ok()
    }

    async fn send_message(&self, text: &str) -> std::result::Result<Delivery, DispatchError> {
        const METHOD: &str = "sendMessage";
        let (bot, chat) = self.destination()?;

        let sent = bot
            .send_message(chat, text)
            .await
            .map_err(|e| request_error(METHOD, bot, e))?;

        Ok(delivered(METHOD, &sent))
    }

    async fn send_document(
        &self,
        file: OutgoingFile<'_>,
        caption: &str,
    ) -> std::result::Result<Delivery, DispatchError> {
        const METHOD: &str = "sendDocument";
        let (bot, chat) = self.destination()?;
        let document = open_upload(file).await?;

        let sent = bot
            .send_document(chat, document)
            .caption(caption)
            .await
            .map_err(|e| request_error(METHOD, bot, e))?;

        Ok(delivered(METHOD, &sent))
    }

    async fn send_photo(
        &self,
        file: OutgoingFile<'_>,
        caption: &str,
    ) -> std::result::Result<Delivery, DispatchError> {
        const METHOD: &str = "sendPhoto";
        let (bot, chat) = self.destination()?;
        let photo = open_upload(file).await?;

        let sent = bot
            .send_photo(chat, photo)
            .caption(caption)
            .await
            .map_err(|e| request_error(METHOD, bot, e))?;

        Ok(delivered(METHOD, &sent))
    }
}

/// Bot API base URL with the trailing slash the bot joins method paths onto
fn api_url(base: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(&format!("{}/", base.trim_end_matches('/'))).map_err(|e| Error::Config {
        message: format!("invalid Telegram API URL: {e}"),
        key: Some("TELEGRAM_API_URL".to_string()),
    })
}

/// Numeric chat ids address a chat directly; anything else is a `@channel`
fn recipient(chat_id: &str) -> Recipient {
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.to_string()),
    }
}

async fn open_upload(file: OutgoingFile<'_>) -> std::result::Result<InputFile, DispatchError> {
    let contents = tokio::fs::File::open(file.path)
        .await
        .map_err(|e| DispatchError::TempFile(e.to_string()))?;
    Ok(InputFile::read(contents).file_name(file.file_name.to_string()))
}

fn delivered(method: &'static str, sent: &Message) -> Delivery {
    let message_id = Some(i64::from(sent.id.0));
    tracing::debug!(method, ?message_id, "Bot API accepted message");
    Delivery { message_id }
}

/// Map a bot request failure, keeping the bot token out of the reason
fn request_error(method: &'static str, bot: &Bot, error: RequestError) -> DispatchError {
    let scrub = |text: String| text.replace(bot.token(), "<redacted>");

    match &error {
        RequestError::Api(api) => DispatchError::Api {
            method,
            description: api.to_string(),
        },
        RequestError::Network(e) => {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", scrub(e.to_string()))
            } else {
                scrub(e.to_string())
            };
            DispatchError::Http { method, reason }
        }
        RequestError::InvalidJson { .. } => DispatchError::Http {
            method,
            reason: "unreadable response".to_string(),
        },
        RequestError::Io(e) => DispatchError::TempFile(e.to_string()),
        _ => DispatchError::Api {
            method,
            description: scrub(error.to_string()),
        },
    }
}
