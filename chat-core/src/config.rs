use std::env;

use auth::TokenIssuer;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::broadcast::BroadcastHub;
use crate::domain::message::service::DEFAULT_RECENT_LIMIT;

/// Application configuration for the chat core.
///
/// Loaded from configuration files with environment variable overrides.
/// Only the token secret is required; every other value falls back to a
/// default when its section is absent.
#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub auth: AuthConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Session token configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,
}

/// Broadcast hub configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Message history configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl AuthConfig {
    /// Session lifetime as a duration.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_leeway_secs() -> u64 {
    TokenIssuer::DEFAULT_LEEWAY_SECS
}

fn default_queue_capacity() -> usize {
    BroadcastHub::DEFAULT_QUEUE_CAPACITY
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

impl ChatConfig {
    /// Load configuration from files with environment variable overrides.
    ///
    /// # Configuration Priority (highest to lowest)
    /// 1. Environment variables (CHAT__AUTH__SECRET, CHAT__HUB__QUEUE_CAPACITY, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// # Returns
    /// Loaded configuration
    ///
    /// # Errors
    /// Returns error if required configuration values are missing or invalid
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: CHAT__AUTH__SECRET=... overrides auth.secret
            .add_source(Environment::with_prefix("CHAT").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
