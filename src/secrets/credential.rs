//! Ambient identity credential
//!
//! Resolves AAD access tokens the way the process would "just have" an
//! identity: environment client credentials when the `AZURE_*` variables
//! are set, otherwise IMDS managed identity. Access tokens are cached
//! until close to expiry; secret values themselves are never cached.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{Error, Result};

/// AAD authority for the client-credentials flow
const AAD_AUTHORITY: &str = "https://login.microsoftonline.com";

/// IMDS managed identity token endpoint
const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// IMDS API version
const IMDS_API_VERSION: &str = "2018-02-01";

/// Refresh window before token expiry (seconds)
const EXPIRY_BUFFER_SECS: u64 = 300;

/// Where this credential gets its tokens from
///
/// No `Debug`: the environment variant holds the client secret.
enum TokenSource {
    /// Client-credentials flow from `AZURE_*` environment variables
    Environment {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// IMDS managed identity
    Imds,
}

/// Cached token info
struct TokenInfo {
    access_token: String,
    expires_at: u64,
}

/// OAuth token response
///
/// IMDS returns `expires_in` as a string; the AAD v2 endpoint returns a
/// number. Accept both.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(deserialize_with = "u64_or_string")]
    expires_in: u64,
}

/// Ambient identity credential with a cached access token
pub struct AmbientCredential {
    client: reqwest::Client,
    source: TokenSource,
    token: Mutex<Option<TokenInfo>>,
}

impl AmbientCredential {
    /// Detect the ambient identity source from the environment
    ///
    /// Uses the client-credentials flow when `AZURE_TENANT_ID`,
    /// `AZURE_CLIENT_ID`, and `AZURE_CLIENT_SECRET` are all set, and IMDS
    /// managed identity otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let source = match (
            std::env::var("AZURE_TENANT_ID"),
            std::env::var("AZURE_CLIENT_ID"),
            std::env::var("AZURE_CLIENT_SECRET"),
        ) {
            (Ok(tenant_id), Ok(client_id), Ok(client_secret)) => {
                tracing::debug!("using environment client credentials");
                TokenSource::Environment {
                    tenant_id,
                    client_id,
                    client_secret,
                }
            }
            _ => {
                tracing::debug!("using IMDS managed identity");
                TokenSource::Imds
            }
        };

        Self {
            client: reqwest::Client::new(),
            source,
            token: Mutex::new(None),
        }
    }

    /// Get an access token for `scope`, refreshing if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint rejects the request or is
    /// unreachable.
    pub async fn token(&self, scope: &str) -> Result<String> {
        {
            let guard = self.token.lock().await;
            if let Some(ref info) = *guard {
                if info.expires_at > now_secs() + EXPIRY_BUFFER_SECS {
                    return Ok(info.access_token.clone());
                }
            }
        }

        let response = self.fetch_token(scope).await?;

        let info = TokenInfo {
            access_token: response.access_token.clone(),
            expires_at: now_secs() + response.expires_in,
        };

        {
            let mut guard = self.token.lock().await;
            *guard = Some(info);
        }

        Ok(response.access_token)
    }

    /// Fetch a fresh token from the configured source
    async fn fetch_token(&self, scope: &str) -> Result<TokenResponse> {
        match &self.source {
            TokenSource::Environment {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let token_url = format!("{AAD_AUTHORITY}/{tenant_id}/oauth2/v2.0/token");

                let response = self
                    .client
                    .post(&token_url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", scope),
                    ])
                    .send()
                    .await
                    .map_err(|e| Error::Vault(format!("token request failed: {e}")))?;

                parse_token_response(response).await
            }
            TokenSource::Imds => {
                // IMDS takes a bare resource, not a scope
                let resource = scope.trim_end_matches("/.default");

                let response = self
                    .client
                    .get(IMDS_TOKEN_URL)
                    .query(&[("api-version", IMDS_API_VERSION), ("resource", resource)])
                    .header("Metadata", "true")
                    .send()
                    .await
                    .map_err(|e| Error::Vault(format!("IMDS token request failed: {e}")))?;

                parse_token_response(response).await
            }
        }
    }
}

/// Check the status and decode a token endpoint response
async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Vault(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| Error::Vault(format!("malformed token response: {e}")))
}

/// Seconds since the Unix epoch
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Accept `expires_in` as either a number or a decimal string
fn u64_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_in_accepts_number_and_string() {
        let aad: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expires_in": 3599}"#).unwrap();
        assert_eq!(aad.expires_in, 3599);

        let imds: TokenResponse =
            serde_json::from_str(r#"{"access_token": "t", "expires_in": "3599"}"#).unwrap();
        assert_eq!(imds.expires_in, 3599);
    }

    #[test]
    fn non_numeric_expires_in_is_rejected() {
        let result = serde_json::from_str::<TokenResponse>(
            r#"{"access_token": "t", "expires_in": "soon"}"#,
        );
        assert!(result.is_err());
    }
}
