//! Command dispatch to the LED device
//!
//! Maps a prediction onto a flat `{color: intent}` JSON body and POSTs it
//! to the configured device address. The response body is relayed back
//! verbatim; the device protocol has no status contract to validate.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::nlu::Prediction;
use crate::{Error, Result};

/// Entity type carrying LED color mentions
const LED_ENTITY: &str = "LED";

/// Report used when a prediction names no known LED
pub const NO_LED_REPORT: &str = "Could not identify a known LED in the command.";

/// Build the `{color: intent}` command body for a prediction
///
/// Returns `None` when the prediction has no `LED` entity. Each LED value
/// contributes its first field as the color identifier; a color mentioned
/// twice keeps only the last write.
#[must_use]
pub fn build_command_body(prediction: &Prediction) -> Option<BTreeMap<String, String>> {
    let leds = prediction.entities.get(LED_ENTITY)?;

    let mut body = BTreeMap::new();
    if let Some(values) = leds.as_array() {
        for value in values {
            let color = value
                .as_array()
                .and_then(|fields| fields.first())
                .and_then(Value::as_str);
            if let Some(color) = color {
                body.insert(color.to_string(), prediction.top_intent.clone());
            }
        }
    }

    Some(body)
}

/// Sends command bodies to the device endpoint
pub struct CommandDispatcher {
    client: reqwest::Client,
    device_url: String,
}

impl CommandDispatcher {
    /// Create a dispatcher for the device at `device_url`
    #[must_use]
    pub fn new(client: reqwest::Client, device_url: String) -> Self {
        Self { client, device_url }
    }

    /// POST a command body to the device and return the raw response text
    ///
    /// The response status is not validated; whatever the device answers
    /// is handed back for the caller to print.
    ///
    /// # Errors
    ///
    /// Returns an error if the POST cannot be sent or the response body
    /// cannot be read.
    pub async fn dispatch(&self, body: &BTreeMap<String, String>) -> Result<String> {
        tracing::debug!(url = %self.device_url, commands = body.len(), "dispatching command");

        let response = self
            .client
            .post(&self.device_url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Device(format!("device request failed: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| Error::Device(format!("device response unreadable: {e}")))
    }
}
