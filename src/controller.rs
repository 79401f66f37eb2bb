//! Pipeline controller
//!
//! Owns the wired pipeline clients and sequences one cycle:
//! listen, classify, dispatch, then wait for the user. Clients are
//! injected at construction and live for the process run; no state is
//! carried from one cycle to the next.

use dialoguer::Confirm;

use crate::config::Config;
use crate::device::{CommandDispatcher, NO_LED_REPORT, build_command_body};
use crate::nlu::IntentClassifier;
use crate::secrets::{AmbientCredential, SecretClient};
use crate::voice::{Microphone, RecognitionOutcome, SpeechRecognizer};
use crate::{Error, Result};

/// The recognize/classify/dispatch pipeline
pub struct Controller {
    recognizer: SpeechRecognizer,
    classifier: IntentClassifier,
    dispatcher: CommandDispatcher,
}

impl Controller {
    /// Resolve credentials and wire up the pipeline clients
    ///
    /// Fetches the speech subscription key, the LUIS application id, and
    /// the LUIS subscription key from the vault, then builds one client
    /// per pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault URL is invalid or a secret cannot be
    /// resolved.
    pub async fn new(config: &Config) -> Result<Self> {
        let credential = AmbientCredential::from_env();
        let vault = SecretClient::new(&config.keyvault_url, credential)?;

        let speech_key = vault.get_secret(&config.speech_secret_name).await?;
        let luis_app_id = vault.get_secret(&config.luis_app_id_secret_name).await?;
        let luis_key = vault.get_secret(&config.luis_secret_name).await?;

        let client = reqwest::Client::new();
        let recognizer = SpeechRecognizer::new(
            client.clone(),
            speech_key,
            config.speech_service_region.clone(),
        );
        let classifier =
            IntentClassifier::new(client.clone(), &config.luis_endpoint, luis_app_id, luis_key);
        let dispatcher = CommandDispatcher::new(client, config.tessel_address.clone());

        Ok(Self {
            recognizer,
            classifier,
            dispatcher,
        })
    }

    /// Run recognize/classify/dispatch cycles until the user stops
    ///
    /// # Errors
    ///
    /// Propagates NLU and device transport failures. Speech no-match and
    /// cancellation outcomes only degrade the current cycle.
    pub async fn run(self) -> Result<()> {
        let mut microphone = Microphone::open()?;

        loop {
            self.cycle(&mut microphone).await?;
            if !prompt_continue()? {
                break;
            }
        }

        Ok(())
    }

    /// Run a single cycle against the given microphone
    ///
    /// # Errors
    ///
    /// Returns an error if the microphone fails or a downstream call
    /// fails fatally.
    pub async fn cycle(&self, microphone: &mut Microphone) -> Result<()> {
        println!("Begin speaking...");

        let query = match self.recognizer.recognize_once(microphone).await? {
            RecognitionOutcome::Recognized(text) => {
                println!("Recognized: {text}");
                text
            }
            RecognitionOutcome::NoMatch => {
                println!("No speech could be recognized.");
                String::new()
            }
            RecognitionOutcome::Canceled { reason, detail } => {
                println!("Speech recognition canceled: {reason}");
                if !detail.is_empty() {
                    println!("Error details: {detail}");
                }
                String::new()
            }
        };

        self.interpret_and_dispatch(&query).await
    }

    /// Classify `query` and forward the resulting command to the device
    ///
    /// # Errors
    ///
    /// Returns an error on NLU failure or device transport failure. A
    /// prediction naming no known LED is reported, not an error.
    pub async fn interpret_and_dispatch(&self, query: &str) -> Result<()> {
        println!("Performing prediction...");
        let prediction = self.classifier.interpret(query).await?;

        println!("Top intent: {}", prediction.top_intent);
        println!("Intents:");
        for (intent, score) in &prediction.intents {
            println!("\t{intent}: {score}");
        }
        println!("Entities: {}", serde_json::to_string(&prediction.entities)?);

        match build_command_body(&prediction) {
            Some(body) => {
                let response = self.dispatcher.dispatch(&body).await?;
                println!("{response}");
            }
            None => println!("{NO_LED_REPORT}"),
        }

        Ok(())
    }
}

/// Block on the continue/stop confirmation between cycles
fn prompt_continue() -> Result<bool> {
    Confirm::new()
        .with_prompt("Issue another command?")
        .default(true)
        .interact()
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}
