use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bgg: BggConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// BoardGameGeek catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BggConfig {
    /// XML API v2 base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Cached entries older than this are refetched (default: 30)
    #[serde(default = "default_max_age_days")]
    pub max_age_days: f64,
    /// Ids per backfill request during a search (default: 20)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Only entries of this subtype are returned by search
    #[serde(default = "default_subtype")]
    pub primary_subtype: String,
    /// `type` filter sent with the remote search request
    #[serde(default = "default_subtype")]
    pub search_type: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Minimum delay between two requests in milliseconds (default: 1000)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BggConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            max_age_days: default_max_age_days(),
            batch_size: default_batch_size(),
            primary_subtype: default_subtype(),
            search_type: default_subtype(),
            timeout_secs: default_timeout(),
            rate_limit_ms: default_rate_limit(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_api_url() -> String {
    "https://boardgamegeek.com/xmlapi2".to_string()
}

fn default_max_age_days() -> f64 {
    30.0
}

fn default_batch_size() -> usize {
    20
}

fn default_subtype() -> String {
    "boardgame".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_rate_limit() -> u64 {
    1000
}

fn default_user_agent() -> String {
    format!("Meeple/{}", env!("CARGO_PKG_VERSION"))
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("meeple.db")
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub bgg: SanitizedBggConfig,
    pub database: DatabaseConfig,
}

/// Sanitized BGG config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBggConfig {
    pub api_url: String,
    pub api_token_configured: bool,
    pub max_age_days: f64,
    pub batch_size: usize,
    pub primary_subtype: String,
    pub search_type: String,
    pub timeout_secs: u32,
    pub rate_limit_ms: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let bgg = &config.bgg;
        Self {
            bgg: SanitizedBggConfig {
                api_url: bgg.api_url.clone(),
                api_token_configured: bgg
                    .api_token
                    .as_ref()
                    .is_some_and(|token| !token.is_empty()),
                max_age_days: bgg.max_age_days,
                batch_size: bgg.batch_size,
                primary_subtype: bgg.primary_subtype.clone(),
                search_type: bgg.search_type.clone(),
                timeout_secs: bgg.timeout_secs,
                rate_limit_ms: bgg.rate_limit_ms,
            },
            database: config.database.clone(),
        }
    }
}
