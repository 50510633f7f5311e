// Secure storage for the app password and provider API key
//
// Secrets are stored in ~/.dealdesk/secrets.toml (global only, not
// per-project). This file should be automatically gitignored.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Secrets stored in ~/.dealdesk/secrets.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecretsConfig {
    /// Password gating the HTTP API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_password: Option<String>,
    /// API key for the hosted interactions provider, propagated to every
    /// downstream call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl SecretsConfig {
    /// Get the secrets file path (~/.dealdesk/secrets.toml)
    pub fn get_secrets_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".dealdesk").join("secrets.toml"))
    }

    /// Load secrets from disk; a missing file is an empty config
    pub fn load() -> Result<Self> {
        let path =
            Self::get_secrets_path().ok_or_else(|| anyhow!("Could not determine home directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow!("Failed to read secrets file '{}': {}", path.display(), e))?;

        let config: SecretsConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse secrets file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save secrets to disk with restrictive permissions
    pub fn save(&self) -> Result<()> {
        let path =
            Self::get_secrets_path().ok_or_else(|| anyhow!("Could not determine home directory"))?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create secrets directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize secrets: {}", e))?;

        fs::write(&path, contents)
            .map_err(|e| anyhow!("Failed to write secrets file '{}': {}", path.display(), e))?;

        // Owner read/write only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, permissions).map_err(|e| {
                anyhow!(
                    "Failed to set permissions on secrets file '{}': {}",
                    path.display(),
                    e
                )
            })?;
        }

        log::info!("Saved secrets to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_config_default() {
        let config = SecretsConfig::default();
        assert!(config.app_password.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = SecretsConfig {
            app_password: Some("hunter2".to_string()),
            api_key: Some("sk-12345".to_string()),
        };

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("app_password"));
        assert!(toml_str.contains("sk-12345"));

        let parsed: SecretsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.app_password.as_deref(), Some("hunter2"));
        assert_eq!(parsed.api_key.as_deref(), Some("sk-12345"));
    }

    #[test]
    fn test_empty_file_parses() {
        let parsed: SecretsConfig = toml::from_str("").unwrap();
        assert!(parsed.app_password.is_none());
        assert!(parsed.api_key.is_none());
    }
}
