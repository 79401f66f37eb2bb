//! Intent classification via a LUIS prediction endpoint
//!
//! One POST per utterance against the fixed `Production` slot of a
//! published LUIS application. Entity payloads are passed through as raw
//! JSON; only the dispatcher decides what it can use.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Deployment slot queried for predictions
const SLOT: &str = "Production";

/// Request body for the prediction endpoint
#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    query: &'a str,
}

/// Envelope of the prediction response
#[derive(Debug, Deserialize)]
struct PredictionResponse {
    prediction: Prediction,
}

/// Result of one intent prediction
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Highest scoring intent label
    #[serde(rename = "topIntent")]
    pub top_intent: String,

    /// Per-intent scores as returned by the service
    #[serde(default)]
    pub intents: BTreeMap<String, Value>,

    /// Extracted entities, keyed by entity type
    #[serde(default)]
    pub entities: BTreeMap<String, Value>,
}

/// Classifies command text against a published LUIS application
pub struct IntentClassifier {
    client: reqwest::Client,
    endpoint: String,
    app_id: SecretString,
    subscription_key: SecretString,
}

impl IntentClassifier {
    /// Create a classifier for the application behind `endpoint`
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        app_id: SecretString,
        subscription_key: SecretString,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            app_id,
            subscription_key,
        }
    }

    /// Run one slot prediction for `query`
    ///
    /// # Errors
    ///
    /// Returns an error on authentication failure, transport failure, or
    /// a malformed response.
    pub async fn interpret(&self, query: &str) -> Result<Prediction> {
        let url = format!(
            "{}/luis/prediction/v3.0/apps/{}/slots/{SLOT}/predict",
            self.endpoint,
            self.app_id.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", self.subscription_key.expose_secret())
            .json(&PredictionRequest { query })
            .send()
            .await
            .map_err(|e| Error::Nlu(format!("prediction request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Nlu(format!(
                "prediction endpoint returned {status}: {body}"
            )));
        }

        let parsed: PredictionResponse = response
            .json()
            .await
            .map_err(|e| Error::Nlu(format!("malformed prediction response: {e}")))?;

        tracing::debug!(top_intent = %parsed.prediction.top_intent, "prediction complete");
        Ok(parsed.prediction)
    }
}
