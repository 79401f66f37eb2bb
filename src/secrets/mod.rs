//! Secret resolution from Azure Key Vault
//!
//! Secrets are fetched by name over the vault REST API using the ambient
//! identity credential. Values are not cached: every lookup is a fresh
//! round trip, and they ride in [`SecretString`] so they never hit logs.

mod credential;

pub use credential::AmbientCredential;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

/// Key Vault REST API version
const API_VERSION: &str = "7.4";

/// Token scope for Key Vault access
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Response from the vault secret GET endpoint
#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

/// Fetches secrets by name from a Key Vault instance
pub struct SecretClient {
    vault_url: Url,
    credential: AmbientCredential,
    client: reqwest::Client,
}

impl SecretClient {
    /// Create a client for the vault at `vault_url`
    ///
    /// # Errors
    ///
    /// Returns an error if `vault_url` is not a valid URL.
    pub fn new(vault_url: &str, credential: AmbientCredential) -> Result<Self> {
        let vault_url = Url::parse(vault_url)
            .map_err(|e| Error::Vault(format!("invalid vault url {vault_url}: {e}")))?;

        Ok(Self {
            vault_url,
            credential,
            client: reqwest::Client::new(),
        })
    }

    /// Fetch the current value of a named secret
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails, the secret does not
    /// exist, or the vault is unreachable. No retry, no fallback.
    pub async fn get_secret(&self, name: &str) -> Result<SecretString> {
        let token = self.credential.token(VAULT_SCOPE).await?;

        let url = self
            .vault_url
            .join(&format!("secrets/{name}"))
            .map_err(|e| Error::Vault(format!("invalid secret name {name}: {e}")))?;

        let response = self
            .client
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| Error::Vault(format!("vault request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::Vault(format!("secret not found: {name}")));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Vault(format!("vault returned {status} for {name}")));
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| Error::Vault(format!("invalid vault response: {e}")))?;

        tracing::debug!(secret = name, "resolved vault secret");
        Ok(SecretString::from(bundle.value))
    }
}
