//! Gateway configuration
//!
//! A flat JSON document with fixed keys, loaded once at startup and
//! immutable for the process lifetime. Every key is required; a missing
//! key fails deserialization before any network call is made.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Key Vault base URL (e.g. `https://my-vault.vault.azure.net`)
    pub keyvault_url: String,

    /// Name of the vault secret holding the speech subscription key
    pub speech_secret_name: String,

    /// Azure region of the speech service (e.g. "westus")
    pub speech_service_region: String,

    /// Name of the vault secret holding the LUIS application id
    pub luis_app_id_secret_name: String,

    /// Name of the vault secret holding the LUIS subscription key
    pub luis_secret_name: String,

    /// LUIS prediction endpoint base URL
    pub luis_endpoint: String,

    /// Device endpoint commanded via HTTP POST
    pub tessel_address: String,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if any required key
    /// is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}

/// Return the default config file path: `~/.config/lumen/config.json`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("lumen").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let config: Config = serde_json::from_str(
            r#"{
                "keyvault_url": "https://my-vault.vault.azure.net",
                "speech_secret_name": "speech-key",
                "speech_service_region": "westus",
                "luis_app_id_secret_name": "luis-app-id",
                "luis_secret_name": "luis-key",
                "luis_endpoint": "https://westus.api.cognitive.microsoft.com",
                "tessel_address": "http://192.168.1.101:8080"
            }"#,
        )
        .unwrap();

        assert_eq!(config.speech_service_region, "westus");
        assert_eq!(config.tessel_address, "http://192.168.1.101:8080");
    }

    #[test]
    fn missing_key_is_rejected() {
        let result = serde_json::from_str::<Config>(r#"{"keyvault_url": "https://v"}"#);
        assert!(result.is_err());
    }
}
