//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default Lab Reader API base URL.
fn default_lab_api_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default per-request timeout for Lab Reader API calls, in seconds.
fn default_lab_request_timeout_secs() -> u64 {
    60
}

/// Default maximum characters per outgoing Telegram message.
///
/// Telegram caps messages at 4096 characters; the default leaves headroom the
/// same way the original bot did.
fn default_message_chunk_limit() -> usize {
    4000
}

/// Default session store endpoint (in-memory).
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

fn default_db_username() -> String {
    String::new()
}

fn default_db_password() -> String {
    String::new()
}

/// Telegram's hard limit on message length.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Configuration for the lab-reader-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Telegram bot token (`LAB_READER_TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Base URL of the Lab Reader API (`LAB_READER_LAB_API_URL`).
    #[serde(default = "default_lab_api_url")]
    pub lab_api_url: String,
    /// Per-request timeout for Lab Reader API calls, in seconds
    /// (`LAB_READER_LAB_REQUEST_TIMEOUT_SECS`).
    #[serde(default = "default_lab_request_timeout_secs")]
    pub lab_request_timeout_secs: u64,
    /// Maximum characters per outgoing Telegram message
    /// (`LAB_READER_MESSAGE_CHUNK_LIMIT`). Must be within 1..=4096.
    #[serde(default = "default_message_chunk_limit")]
    pub message_chunk_limit: usize,
    /// Session store endpoint (`LAB_READER_DB_ENDPOINT`), e.g. `mem://` or a
    /// `ws://` SurrealDB address.
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Session store username (`LAB_READER_DB_USERNAME`); empty skips sign-in.
    #[serde(default = "default_db_username")]
    pub db_username: String,
    /// Session store password (`LAB_READER_DB_PASSWORD`).
    #[serde(default = "default_db_password")]
    pub db_password: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("LAB_READER"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new("lab-reader.toml").exists() {
            cfg = cfg.add_source(config::File::with_name("lab-reader.toml"));
        }

        let mut inner: ConfigInner = cfg.build()?.try_deserialize()?;

        // The original bot stripped trailing slashes before joining endpoint paths.
        inner.lab_api_url = normalize_api_url(&inner.lab_api_url);

        let result = Config { inner: Arc::new(inner) };

        if result.telegram_bot_token.is_empty() {
            return Err(anyhow::anyhow!("Telegram bot token must be set."));
        }

        if result.message_chunk_limit < 1 || result.message_chunk_limit > TELEGRAM_MESSAGE_LIMIT {
            return Err(anyhow::anyhow!("Message chunk limit must be between 1 and {TELEGRAM_MESSAGE_LIMIT}."));
        }

        if result.lab_request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Lab request timeout must be at least 1 second."));
        }

        Ok(result)
    }
}

/// Strip trailing slashes so endpoint paths can be appended verbatim.
pub fn normalize_api_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_api_url_strips_trailing_slashes() {
        assert_eq!(normalize_api_url("http://localhost:8000/"), "http://localhost:8000");
        assert_eq!(normalize_api_url("http://localhost:8000///"), "http://localhost:8000");
        assert_eq!(normalize_api_url("https://lab.example.com"), "https://lab.example.com");
    }
}
