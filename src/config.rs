//! # Configuration Module
//!
//! Runtime configuration for the order bot, read from environment variables
//! (a `.env` file is loaded first by `main`).
//!
//! ## Required
//! - `BOT_TOKEN` - Telegram bot token
//!
//! ## Optional
//! - `ADMIN_CHAT_ID` - chat that receives new-order notifications (disabled when unset)
//! - `SHEET_NAME` - spreadsheet title (default: `Orders`)
//! - `SPREADSHEET_ID` - spreadsheet id, skips the lookup by title
//! - `GOOGLE_CREDS_JSON` - service account key file (default: `service_account.json`)
//! - `MENU_WORKSHEET` / `ORDERS_WORKSHEET` - worksheet titles (default: `Menu` / `Orders`)
//! - `PORT` - liveness HTTP port (default: 8000)
//! - `SESSION_TTL_SECS` - idle conversation expiry (default: 3600)
//! - `SHEETS_TIMEOUT_SECS` - HTTP timeout for Google APIs (default: 15)
//! - `SINK_MAX_RETRIES` - extra attempts when appending an order (default: 3)
//! - `DEFAULT_LANGUAGE` - fallback locale (default: `en`)

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use teloxide::types::ChatId;
use thiserror::Error;

pub const DEFAULT_SHEET_NAME: &str = "Orders";
pub const DEFAULT_CREDS_FILE: &str = "service_account.json";
pub const DEFAULT_MENU_WORKSHEET: &str = "Menu";
pub const DEFAULT_ORDERS_WORKSHEET: &str = "Orders";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_SHEETS_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Retry and circuit breaker settings for order submission
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Number of retries after the first failed append
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Consecutive failed submissions before the breaker opens
    pub circuit_breaker_threshold: u32,
    /// Time the breaker stays open before letting a submission through
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 500,  // 0.5 seconds
            max_retry_delay_ms: 5000,  // 5 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), without jitter.
    ///
    /// Doubles from `base_retry_delay_ms` and is capped at `max_retry_delay_ms`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_retry_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_retry_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Google Sheets settings
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    /// Spreadsheet title, resolved through the Drive API
    pub sheet_name: String,
    /// Explicit spreadsheet id, takes precedence over the title
    pub spreadsheet_id: Option<String>,
    /// Path of the service account JSON key
    pub credentials_path: PathBuf,
    pub menu_worksheet: String,
    pub orders_worksheet: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            spreadsheet_id: None,
            credentials_path: PathBuf::from(DEFAULT_CREDS_FILE),
            menu_worksheet: DEFAULT_MENU_WORKSHEET.to_string(),
            orders_worksheet: DEFAULT_ORDERS_WORKSHEET.to_string(),
            timeout: Duration::from_secs(DEFAULT_SHEETS_TIMEOUT_SECS),
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// Notifications are disabled when `None`
    pub admin_chat_id: Option<ChatId>,
    pub sheets: SheetsConfig,
    /// Port of the liveness HTTP listener
    pub port: u16,
    /// Idle time after which a conversation starts over
    pub session_ttl: Duration,
    pub retry: RetryConfig,
    pub default_language: String,
}

impl BotConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = get("BOT_TOKEN").ok_or_else(|| ConfigError::MissingEnvVar("BOT_TOKEN".into()))?;

        let admin_chat_id = get("ADMIN_CHAT_ID")
            .map(|raw| parse_var::<i64>("ADMIN_CHAT_ID", &raw).map(ChatId))
            .transpose()?;

        let mut retry = RetryConfig::default();
        if let Some(raw) = get("SINK_MAX_RETRIES") {
            retry.max_retries = parse_var("SINK_MAX_RETRIES", &raw)?;
        }

        let sheets = SheetsConfig {
            sheet_name: get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            spreadsheet_id: get("SPREADSHEET_ID"),
            credentials_path: get("GOOGLE_CREDS_JSON")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDS_FILE)),
            menu_worksheet: get("MENU_WORKSHEET").unwrap_or_else(|| DEFAULT_MENU_WORKSHEET.to_string()),
            orders_worksheet: get("ORDERS_WORKSHEET")
                .unwrap_or_else(|| DEFAULT_ORDERS_WORKSHEET.to_string()),
            timeout: get("SHEETS_TIMEOUT_SECS")
                .map(|raw| parse_secs("SHEETS_TIMEOUT_SECS", &raw))
                .transpose()?
                .unwrap_or(Duration::from_secs(DEFAULT_SHEETS_TIMEOUT_SECS)),
        };

        let port = get("PORT")
            .map(|raw| parse_var("PORT", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let session_ttl = get("SESSION_TTL_SECS")
            .map(|raw| parse_secs("SESSION_TTL_SECS", &raw))
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECS));

        Ok(Self {
            bot_token,
            admin_chat_id,
            sheets,
            port,
            session_ttl,
            retry,
            default_language: get("DEFAULT_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        })
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_string(), raw.to_string()))
}

/// A positive number of seconds
fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    match parse_var::<u64>(key, raw)? {
        0 => Err(ConfigError::InvalidEnvVar(key.to_string(), raw.to_string())),
        secs => Ok(Duration::from_secs(secs)),
    }
}
