//! Lumen Gateway - voice-controlled LED gateway
//!
//! This library provides the pipeline behind the `lumen` binary: capture
//! one microphone utterance, transcribe it via the Azure Speech service,
//! classify intent and entities via a LUIS prediction endpoint, and
//! forward the resulting `{color: intent}` command to an LED device over
//! HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌─────────────┐   ┌────────────┐
//! │ Microphone │──▶│ Speech      │──▶│ Intent      │──▶│ LED device │
//! │ (cpal)     │   │ transcriber │   │ classifier  │   │ (HTTP POST)│
//! └────────────┘   └──────┬──────┘   └──────┬──────┘   └────────────┘
//!                         │                 │
//!                  ┌──────▼─────────────────▼───────┐
//!                  │  Key Vault (subscription keys, │
//!                  │  LUIS application id)          │
//!                  └────────────────────────────────┘
//! ```
//!
//! The pipeline is sequential: each stage completes before the next runs,
//! and the loop blocks on a console prompt between cycles.

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod nlu;
pub mod secrets;
pub mod voice;

pub use config::Config;
pub use controller::Controller;
pub use error::{Error, Result};
