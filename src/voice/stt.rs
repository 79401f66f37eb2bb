//! One-shot speech recognition
//!
//! Captures a single utterance from the microphone and transcribes it via
//! the Azure Speech REST endpoint for short audio. Service and transport
//! failures surface through [`RecognitionOutcome::Canceled`]; only a
//! microphone that cannot be started is a hard error.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::capture::{Microphone, SAMPLE_RATE, samples_to_wav};
use super::endpoint::{Endpoint, UtteranceDetector};
use crate::Result;

/// Poll interval while draining the capture buffer
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Recognition language sent to the speech endpoint
const LANGUAGE: &str = "en-US";

/// Outcome of one recognition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The utterance was transcribed
    Recognized(String),
    /// Audio was captured but no speech could be recognized
    NoMatch,
    /// The recognition session ended without a result
    Canceled {
        /// Coarse failure class reported by the service
        reason: String,
        /// Error detail text, when available
        detail: String,
    },
}

/// Response from the speech recognition endpoint
#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(rename = "RecognitionStatus")]
    status: String,
    #[serde(rename = "DisplayText", default)]
    display_text: String,
}

/// Transcribes single microphone utterances
pub struct SpeechRecognizer {
    client: reqwest::Client,
    subscription_key: SecretString,
    region: String,
}

impl SpeechRecognizer {
    /// Create a recognizer for the speech service in `region`
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        subscription_key: SecretString,
        region: String,
    ) -> Self {
        Self {
            client,
            subscription_key,
            region,
        }
    }

    /// Capture one utterance and transcribe it
    ///
    /// Blocks the cycle until the endpointer closes the utterance or the
    /// initial-silence window elapses. Pure leading silence short-circuits
    /// to [`RecognitionOutcome::NoMatch`] without calling the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the microphone cannot be started or the
    /// captured audio cannot be encoded.
    pub async fn recognize_once(&self, microphone: &mut Microphone) -> Result<RecognitionOutcome> {
        let Some(samples) = listen(microphone).await? else {
            return Ok(RecognitionOutcome::NoMatch);
        };

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        Ok(self.transcribe(wav).await)
    }

    /// Send one WAV utterance to the recognition endpoint
    async fn transcribe(&self, wav: Vec<u8>) -> RecognitionOutcome {
        tracing::debug!(audio_bytes = wav.len(), "starting transcription");

        let url = format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            self.region
        );

        let response = self
            .client
            .post(&url)
            .query(&[("language", LANGUAGE), ("format", "simple")])
            .header("Ocp-Apim-Subscription-Key", self.subscription_key.expose_secret())
            .header(
                "Content-Type",
                "audio/wav; codecs=audio/pcm; samplerate=16000",
            )
            .body(wav)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "speech request failed");
                return RecognitionOutcome::Canceled {
                    reason: "Error".to_string(),
                    detail: format!("speech request failed: {e}"),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "speech endpoint error");
            return RecognitionOutcome::Canceled {
                reason: "Error".to_string(),
                detail: format!("speech endpoint returned {status}: {body}"),
            };
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                return RecognitionOutcome::Canceled {
                    reason: "Error".to_string(),
                    detail: format!("speech response unreadable: {e}"),
                };
            }
        };

        let outcome = parse_recognition_response(&body);
        if let RecognitionOutcome::Recognized(text) = &outcome {
            tracing::info!(transcript = %text, "transcription complete");
        }
        outcome
    }
}

/// Capture one endpointed utterance, or `None` on pure leading silence
async fn listen(microphone: &mut Microphone) -> Result<Option<Vec<f32>>> {
    microphone.start()?;

    let mut detector = UtteranceDetector::new();
    let samples = loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        let chunk = microphone.drain();
        match detector.push(&chunk) {
            Endpoint::Pending => {}
            Endpoint::Complete => break Some(detector.take_samples()),
            Endpoint::TimedOut => break None,
        }
    };

    microphone.stop();
    Ok(samples)
}

/// Map a recognition response body onto the outcome type
fn parse_recognition_response(body: &str) -> RecognitionOutcome {
    let parsed: RecognitionResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            return RecognitionOutcome::Canceled {
                reason: "Error".to_string(),
                detail: format!("malformed recognition response: {e}"),
            };
        }
    };

    match parsed.status.as_str() {
        "Success" => RecognitionOutcome::Recognized(parsed.display_text),
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => RecognitionOutcome::NoMatch,
        other => RecognitionOutcome::Canceled {
            reason: other.to_string(),
            detail: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_recognized() {
        let outcome = parse_recognition_response(
            r#"{"RecognitionStatus": "Success", "DisplayText": "Turn on the red light.", "Offset": 0, "Duration": 12000000}"#,
        );
        assert_eq!(
            outcome,
            RecognitionOutcome::Recognized("Turn on the red light.".to_string())
        );
    }

    #[test]
    fn no_match_family_maps_to_no_match() {
        for status in ["NoMatch", "InitialSilenceTimeout", "BabbleTimeout"] {
            let body = format!(r#"{{"RecognitionStatus": "{status}"}}"#);
            assert_eq!(
                parse_recognition_response(&body),
                RecognitionOutcome::NoMatch,
                "status {status}"
            );
        }
    }

    #[test]
    fn unknown_status_maps_to_canceled() {
        let outcome = parse_recognition_response(r#"{"RecognitionStatus": "Error"}"#);
        let RecognitionOutcome::Canceled { reason, .. } = outcome else {
            panic!("expected canceled outcome");
        };
        assert_eq!(reason, "Error");
    }

    #[test]
    fn malformed_body_maps_to_canceled() {
        let outcome = parse_recognition_response("not json");
        let RecognitionOutcome::Canceled { reason, detail } = outcome else {
            panic!("expected canceled outcome");
        };
        assert_eq!(reason, "Error");
        assert!(detail.contains("malformed"));
    }
}
