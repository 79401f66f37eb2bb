//! Voice input pipeline
//!
//! Microphone capture, utterance endpointing, and one-shot speech
//! recognition against the Azure Speech REST endpoint.

mod capture;
mod endpoint;
mod stt;

pub use capture::{Microphone, SAMPLE_RATE, samples_to_wav};
pub use endpoint::{Endpoint, UtteranceDetector};
pub use stt::{RecognitionOutcome, SpeechRecognizer};
