//! Client configuration: base URL and environment selection.
//!
//! Configuration is an explicit value handed to a client at construction.
//! A process-wide default can additionally be installed once at startup via
//! [`init`]; [`crate::CodeepClient::new`] reads that slot, falling back to
//! the environment variables when nothing was installed.

use once_cell::sync::OnceCell;

use crate::{Error, Result};

/// Public production endpoint.
pub const PRODUCTION_BASE_URL: &str = "https://api.codeep.cc/v1";
/// Local development endpoint.
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:5001";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "CODEEP_API_BASE_URL";
/// Environment variable selecting the environment
/// (`development` or `production`).
pub const ENV_ENVIRONMENT: &str = "CODEEP_ENVIRONMENT";

/// Where the client points and which environment it believes it is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
    environment: String,
}

impl Config {
    /// Production configuration. This is also the [`Default`].
    pub fn production() -> Self {
        Self {
            base_url: PRODUCTION_BASE_URL.to_string(),
            environment: "production".to_string(),
        }
    }

    /// Development configuration pointing at a local server.
    pub fn development() -> Self {
        Self {
            base_url: DEVELOPMENT_BASE_URL.to_string(),
            environment: "development".to_string(),
        }
    }

    /// Configuration derived from `CODEEP_ENVIRONMENT` and
    /// `CODEEP_API_BASE_URL`.
    ///
    /// The environment variable is applied first (switching to the
    /// corresponding endpoint), then an explicit base URL wins over it.
    /// Unset means production.
    pub fn from_env() -> Self {
        let mut config = Self::production();
        if let Ok(environment) = std::env::var(ENV_ENVIRONMENT) {
            config.set_environment(&environment);
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                config.set_base_url(url);
            }
        }
        config
    }

    /// Base URL requests are issued against, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current environment label, lowercased.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Point at an explicit base URL. Trailing slashes are stripped so path
    /// concatenation stays predictable. The environment label is untouched.
    pub fn set_base_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
    }

    /// Switch environments.
    ///
    /// `development` and `production` (case-insensitive) move the base URL
    /// to their respective endpoints. Any other label is recorded but the
    /// URL is left as it was.
    pub fn set_environment(&mut self, environment: &str) {
        self.environment = environment.to_lowercase();
        match self.environment.as_str() {
            "development" => self.base_url = DEVELOPMENT_BASE_URL.to_string(),
            "production" => self.base_url = PRODUCTION_BASE_URL.to_string(),
            _ => {}
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::production()
    }
}

static DEFAULT_CONFIG: OnceCell<Config> = OnceCell::new();

/// Install the process-wide default configuration used by
/// [`crate::CodeepClient::new`].
///
/// This is a set-once slot: a second call fails with a validation error
/// instead of silently replacing a default other code may already rely on.
pub fn init(config: Config) -> Result<()> {
    DEFAULT_CONFIG
        .set(config)
        .map_err(|_| Error::validation("default configuration already initialized"))
}

/// The installed default configuration, or one derived from the environment
/// when [`init`] was never called.
pub fn default_config() -> Config {
    DEFAULT_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(Config::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = Config::default();
        assert_eq!(config.base_url(), PRODUCTION_BASE_URL);
        assert!(config.is_production());
        assert!(!config.is_development());
    }

    #[test]
    fn test_development_points_at_localhost() {
        let config = Config::development();
        assert_eq!(config.base_url(), "http://localhost:5001");
        assert!(config.is_development());
    }

    #[test]
    fn test_set_environment_switches_known_urls() {
        let mut config = Config::production();
        config.set_environment("development");
        assert_eq!(config.base_url(), DEVELOPMENT_BASE_URL);

        config.set_environment("PRODUCTION");
        assert_eq!(config.base_url(), PRODUCTION_BASE_URL);
        assert_eq!(config.environment(), "production");
    }

    #[test]
    fn test_set_environment_unknown_label_keeps_url() {
        let mut config = Config::development();
        config.set_environment("staging");
        assert_eq!(config.environment(), "staging");
        assert_eq!(config.base_url(), DEVELOPMENT_BASE_URL);
        assert!(!config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_set_base_url_strips_trailing_slashes() {
        let mut config = Config::production();
        config.set_base_url("https://staging.codeep.cc/v1///");
        assert_eq!(config.base_url(), "https://staging.codeep.cc/v1");
    }

    #[test]
    fn test_custom_url_does_not_change_environment() {
        let mut config = Config::production();
        config.set_base_url("http://10.0.0.5:8080");
        assert!(config.is_production());
        assert_eq!(config.base_url(), "http://10.0.0.5:8080");
    }

    // No other test touches the process-default slot, so the double-init
    // behavior is observable deterministically here.
    #[test]
    fn test_init_is_set_once() {
        assert!(init(Config::development()).is_ok());
        let err = init(Config::production()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(default_config().base_url(), DEVELOPMENT_BASE_URL);
    }
}
