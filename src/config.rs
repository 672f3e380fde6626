//! Configuration types for report-relay
//!
//! Configuration is read once at startup, either built directly or loaded
//! from the process environment (with an optional `.env` file) through
//! [`Config::from_env`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Telegram Bot API destination
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Base URL of the Bot API (default: "https://api.telegram.org")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bot token (`BOT_TOKEN`)
    #[serde(default, skip_serializing)]
    pub bot_token: Option<String>,

    /// Target chat id or `@channel` username (`CHAT_ID`)
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Timeout applied to each Bot API request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            bot_token: None,
            chat_id: None,
            request_timeout: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl TelegramConfig {
    /// True when both the bot token and the chat id are set and non-blank
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.bot_token) && present(&self.chat_id)
    }
}

/// Attachment limits and scratch storage
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum attachment size in bytes (default: 10 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Lowercase extensions accepted for attachments
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: BTreeSet<String>,

    /// Extensions sent as photos (with preview) instead of documents
    #[serde(default = "default_image_extensions")]
    pub image_extensions: BTreeSet<String>,

    /// Directory for short-lived upload files (default: "./uploads")
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
            image_extensions: default_image_extensions(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl UploadConfig {
    /// Whether `extension` (already lowercased) may be uploaded
    pub fn is_allowed(&self, extension: &str) -> bool {
        !extension.is_empty() && self.allowed_extensions.contains(extension)
    }

    /// Whether `extension` should be relayed as a photo
    pub fn is_image(&self, extension: &str) -> bool {
        self.image_extensions.contains(extension)
    }
}

/// HTTP server settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: false)
    #[serde(default)]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: false,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for report-relay
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Messaging destination
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Attachment limits and scratch storage
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or `env_file`, when given) is
    /// loaded first; variables already present in the environment win.
    pub fn from_env(env_file: Option<&std::path::Path>) -> Result<Self> {
        let loaded = match env_file {
            Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
            None => dotenvy::dotenv(),
        };
        match loaded {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded env file"),
            Err(e) if e.not_found() && env_file.is_none() => {}
            Err(e) => {
                return Err(Error::Config {
                    message: format!("failed to load env file: {}", e),
                    key: None,
                });
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset or blank keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Config::default();

        config.telegram.bot_token = get("BOT_TOKEN");
        config.telegram.chat_id = get("CHAT_ID");
        if let Some(url) = get("TELEGRAM_API_URL") {
            url::Url::parse(&url).map_err(|e| Error::Config {
                message: format!("invalid URL '{}': {}", url, e),
                key: Some("TELEGRAM_API_URL".to_string()),
            })?;
            config.telegram.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("TELEGRAM_TIMEOUT_SECS") {
            config.telegram.request_timeout =
                Duration::from_secs(parse_number("TELEGRAM_TIMEOUT_SECS", &secs)?);
        }

        if let Some(mb) = get("MAX_CONTENT_LENGTH_MB") {
            let mb: u64 = parse_number("MAX_CONTENT_LENGTH_MB", &mb)?;
            config.upload.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        }
        if let Some(dir) = get("UPLOAD_FOLDER") {
            config.upload.upload_dir = PathBuf::from(dir);
        }
        if let Some(list) = get("ALLOWED_EXTENSIONS") {
            config.upload.allowed_extensions = parse_extension_list(&list);
        }
        if let Some(list) = get("IMAGE_EXTENSIONS") {
            config.upload.image_extensions = parse_extension_list(&list);
        }

        let host = match get("HOST") {
            Some(host) => host.parse::<IpAddr>().map_err(|e| Error::Config {
                message: format!("invalid host '{}': {}", host, e),
                key: Some("HOST".to_string()),
            })?,
            None => config.server.bind_address.ip(),
        };
        let port = match get("PORT") {
            Some(port) => parse_number("PORT", &port)?,
            None => config.server.bind_address.port(),
        };
        config.server.bind_address = SocketAddr::new(host, port);

        if let Some(flag) = get("CORS_ENABLED") {
            config.server.cors_enabled = parse_flag("CORS_ENABLED", &flag)?;
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(flag) = get("SWAGGER_UI") {
            config.server.swagger_ui = parse_flag("SWAGGER_UI", &flag)?;
        }

        Ok(config)
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| Error::Config {
        message: format!("invalid value '{}' for {}: {}", value, key, e),
        key: Some(key.to_string()),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config {
            message: format!("invalid boolean '{}' for {}", other, key),
            key: Some(key.to_string()),
        }),
    }
}

/// Split a comma separated extension list, lowercasing and dropping leading dots
pub fn parse_extension_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> BTreeSet<String> {
    parse_extension_list("jpg,jpeg,png,pdf,doc,docx,xls,xlsx,txt,zip")
}

fn default_image_extensions() -> BTreeSet<String> {
    parse_extension_list("jpg,jpeg,png")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000)
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
