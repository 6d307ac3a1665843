//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::TimeWindow;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Platform access settings
    #[serde(default)]
    pub reddit: RedditConfig,

    /// Traversal and export settings
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.reddit.user_agent.trim().is_empty() {
            return Err(AppError::validation("reddit.user_agent is empty"));
        }
        if self.reddit.timeout_secs == 0 {
            return Err(AppError::validation("reddit.timeout_secs must be > 0"));
        }
        if self.reddit.listing_limit == 0 || self.reddit.listing_limit > 1000 {
            return Err(AppError::validation(
                "reddit.listing_limit must be between 1 and 1000",
            ));
        }
        if self.reddit.more_children_batch == 0 || self.reddit.more_children_batch > 100 {
            return Err(AppError::validation(
                "reddit.more_children_batch must be between 1 and 100",
            ));
        }
        if self.reddit.client_id.is_some() != self.reddit.client_secret.is_some() {
            return Err(AppError::validation(
                "reddit.client_id and reddit.client_secret must be set together",
            ));
        }
        if self.profile.output_dir.trim().is_empty() {
            return Err(AppError::validation("profile.output_dir is empty"));
        }
        Ok(())
    }
}

/// Platform client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// Host for anonymous JSON requests
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Host for authenticated requests
    #[serde(default = "defaults::oauth_base_url")]
    pub oauth_base_url: String,

    /// Application-only token endpoint
    #[serde(default = "defaults::token_url")]
    pub token_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum items read from one "top" listing
    #[serde(default = "defaults::listing_limit")]
    pub listing_limit: usize,

    /// Comment ids expanded per "load more" request
    #[serde(default = "defaults::more_children_batch")]
    pub more_children_batch: usize,

    /// OAuth client id; enables authenticated access together with the secret
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,
}

impl RedditConfig {
    /// Credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            oauth_base_url: defaults::oauth_base_url(),
            token_url: defaults::token_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            listing_limit: defaults::listing_limit(),
            more_children_batch: defaults::more_children_batch(),
            client_id: None,
            client_secret: None,
        }
    }
}

/// Traversal and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Lookback for the root subreddit's top submissions
    #[serde(default = "defaults::subreddit_window")]
    pub subreddit_window: String,

    /// Lookback for each participant's own history
    #[serde(default = "defaults::redditor_window")]
    pub redditor_window: String,

    /// Include NSFW flag and subscriber count in exports
    #[serde(default)]
    pub verbose: bool,

    /// Directory export files are written into
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl ProfileConfig {
    /// Subreddit lookback, falling back to the default on an unknown label.
    pub fn subreddit_window(&self) -> TimeWindow {
        TimeWindow::coerce(&self.subreddit_window, TimeWindow::SUBREDDIT_DEFAULT)
    }

    /// Redditor lookback, falling back to the default on an unknown label.
    pub fn redditor_window(&self) -> TimeWindow {
        TimeWindow::coerce(&self.redditor_window, TimeWindow::REDDITOR_DEFAULT)
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            subreddit_window: defaults::subreddit_window(),
            redditor_window: defaults::redditor_window(),
            verbose: false,
            output_dir: defaults::output_dir(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use crate::models::TimeWindow;

    // Client defaults
    pub fn base_url() -> String {
        "https://www.reddit.com".into()
    }
    pub fn oauth_base_url() -> String {
        "https://oauth.reddit.com".into()
    }
    pub fn token_url() -> String {
        "https://www.reddit.com/api/v1/access_token".into()
    }
    pub fn user_agent() -> String {
        concat!("rust:subprofiler:v", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn listing_limit() -> usize {
        100
    }
    pub fn more_children_batch() -> usize {
        100
    }

    // Profile defaults
    pub fn subreddit_window() -> String {
        TimeWindow::SUBREDDIT_DEFAULT.as_str().into()
    }
    pub fn redditor_window() -> String {
        TimeWindow::REDDITOR_DEFAULT.as_str().into()
    }
    pub fn output_dir() -> String {
        ".".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
