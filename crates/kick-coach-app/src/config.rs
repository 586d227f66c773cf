//! Runtime configuration sourced from environment variables.

use std::sync::Arc;
use std::time::Duration;

use kick_coach_upload::{
    AnalysisClient, ClientSetupError, DEFAULT_TIMEOUT, FormLayout, HttpTransport,
    validate_endpoint,
};
use thiserror::Error;

/// Analysis endpoint URL.
pub const ENV_ENDPOINT: &str = "KICK_COACH_ENDPOINT";
/// Request timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "KICK_COACH_TIMEOUT_SECS";
/// Multipart layout: `standard` or `legacy`.
pub const ENV_FORM_LAYOUT: &str = "KICK_COACH_FORM_LAYOUT";

/// Endpoint used when none is configured (local analysis backend).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/get_stuff";

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Analysis endpoint.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Multipart field layout.
    pub form_layout: FormLayout,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            form_layout: FormLayout::Standard,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset or blank keys keep their
    /// defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for an invalid endpoint, a non-positive or
    /// unparsable timeout, or an unknown form layout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = value(ENV_ENDPOINT) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(raw) = value(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&raw)?;
        }

        if let Some(raw) = value(ENV_FORM_LAYOUT) {
            config.form_layout = raw.parse().map_err(ConfigError::Client)?;
        }

        validate_endpoint(&config.endpoint).map_err(ConfigError::Client)?;
        Ok(config)
    }

    /// Builds an HTTP-backed analysis client.
    ///
    /// # Errors
    /// Returns [`ConfigError::Client`] when the endpoint or HTTP client cannot
    /// be set up.
    pub fn build_client(&self) -> Result<AnalysisClient, ConfigError> {
        let transport = HttpTransport::new(self.timeout).map_err(ConfigError::Client)?;
        AnalysisClient::new(&self.endpoint, Arc::new(transport)).map_err(ConfigError::Client)
    }
}

/// Parses a timeout given in whole seconds.
///
/// # Errors
/// Returns [`ConfigError::InvalidTimeout`] for zero or non-numeric input.
pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Timeout is zero or not a whole number of seconds.
    #[error("invalid timeout {0:?}, expected a positive number of seconds")]
    InvalidTimeout(String),
    /// Endpoint, layout, or HTTP client setup failed.
    #[error(transparent)]
    Client(#[from] ClientSetupError),
}
