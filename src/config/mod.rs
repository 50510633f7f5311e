// Application configuration
//
// Values come from (highest precedence first) environment variables, the
// secrets file, then defaults. The provider API key has no default; the
// server refuses to start without one.

mod secrets;

pub use secrets::SecretsConfig;

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::provider::PollConfig;

/// Fallback password used only when nothing is configured
pub const DEFAULT_APP_PASSWORD: &str = "admin123";

/// Results shorter than this many characters are treated as degenerate
/// and raise a soft warning instead of advancing the workflow
pub const DEFAULT_MIN_RESULT_CHARS: usize = 40;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Password gating the login endpoint
    pub app_password: String,
    /// Provider API key
    pub api_key: String,
    /// Base URL of the hosted interactions API
    pub provider_base_url: String,
    /// Model used for the planning call
    pub planning_model: String,
    /// Agent used for the background deep-research call
    pub research_agent: String,
    /// Model used by the analysis pipeline stages
    pub analysis_model: String,
    /// Directory for chart/report/infographic artifacts
    pub outputs_dir: PathBuf,
    /// Polling cadence and bound for background research
    pub poll: PollConfig,
    /// Degenerate-result threshold in characters
    pub min_result_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_password: DEFAULT_APP_PASSWORD.to_string(),
            api_key: String::new(),
            provider_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            planning_model: "gemini-3-flash-preview".to_string(),
            research_agent: "deep-research-pro-preview-12-2025".to_string(),
            analysis_model: "gemini-3-pro-preview".to_string(),
            outputs_dir: PathBuf::from("outputs"),
            poll: PollConfig::default(),
            min_result_chars: DEFAULT_MIN_RESULT_CHARS,
        }
    }
}

impl AppConfig {
    /// Build the config from secrets file and environment
    pub fn load() -> Result<Self> {
        let secrets = SecretsConfig::load().unwrap_or_else(|e| {
            log::warn!("Could not load secrets file: {}", e);
            SecretsConfig::default()
        });

        let mut config = AppConfig::default();

        if let Some(password) = secrets.app_password {
            config.app_password = password;
        }
        if let Some(key) = secrets.api_key {
            config.api_key = key;
        }

        if let Ok(password) = std::env::var("DEALDESK_APP_PASSWORD") {
            config.app_password = password;
        }
        if let Ok(key) = std::env::var("DEALDESK_API_KEY") {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("DEALDESK_PROVIDER_URL") {
            config.provider_base_url = url;
        }

        Ok(config)
    }

    /// Fail when required values are missing
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!(
                "No provider API key configured. Set DEALDESK_API_KEY or add api_key to {}",
                SecretsConfig::get_secrets_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "~/.dealdesk/secrets.toml".to_string())
            );
        }
        Ok(())
    }

    /// Override the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_password, DEFAULT_APP_PASSWORD);
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.outputs_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());

        let config = AppConfig {
            api_key: "sk-test".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_interval_override() {
        let config = AppConfig::default().with_poll_interval(Duration::from_secs(3));
        assert_eq!(config.poll.interval, Duration::from_secs(3));
    }
}
