use std::env;
use std::path::PathBuf;
use tracing::info;

pub const TARGET_URL: &str = "https://www.flightaware.com/live/aircrafttype/";
pub const DEFAULT_WATCHLIST_PATH: &str = "planes.csv";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Where the watchlist table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistSource {
    LocalFile(PathBuf),
    Remote(String),
}

impl WatchlistSource {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            WatchlistSource::Remote(value.to_string())
        } else {
            WatchlistSource::LocalFile(PathBuf::from(value))
        }
    }
}

impl Default for WatchlistSource {
    fn default() -> Self {
        WatchlistSource::LocalFile(PathBuf::from(DEFAULT_WATCHLIST_PATH))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub chat_id: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: TELEGRAM_API_BASE.to_string(),
            token: None,
            chat_id: None,
        }
    }
}

/// Settings for a single check run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub target_url: String,
    pub watchlist: WatchlistSource,
    pub telegram: TelegramConfig,
}

impl Config {
    pub fn load() -> Self {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key-value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let watchlist = get("WATCHLIST_SOURCE")
            .map(|v| WatchlistSource::parse(&v))
            .unwrap_or_default();

        Config {
            target_url: TARGET_URL.to_string(),
            watchlist,
            telegram: TelegramConfig {
                api_base: TELEGRAM_API_BASE.to_string(),
                token: get("TELEGRAM_TOKEN"),
                chat_id: get("TELEGRAM_CHAT_ID"),
            },
        }
    }

    pub fn log_redacted(&self) {
        let watchlist = match &self.watchlist {
            WatchlistSource::LocalFile(path) => path.display().to_string(),
            WatchlistSource::Remote(url) => url.clone(),
        };
        info!(
            target_url = %self.target_url,
            watchlist = %watchlist,
            telegram_token = if self.telegram.token.is_some() { "set" } else { "missing" },
            telegram_chat_id = if self.telegram.chat_id.is_some() { "set" } else { "missing" },
            "Loaded configuration"
        );
    }
}
