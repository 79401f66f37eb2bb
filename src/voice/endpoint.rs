//! Utterance endpointing
//!
//! Decides where a spoken command starts and ends using RMS energy:
//! speech begins when the level crosses a threshold, and the utterance is
//! complete after a trailing silence window. A pure sample-pushing state
//! machine, so it can be driven from tests without audio hardware.

/// Minimum RMS energy to consider a chunk speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum speech length for a usable utterance (samples at 16 kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// Trailing silence that ends an utterance (samples)
const TRAILING_SILENCE_SAMPLES: usize = 8000; // 0.5 seconds

/// Leading silence before giving up without speech (samples)
const INITIAL_SILENCE_SAMPLES: usize = 80_000; // 5 seconds

/// Hard cap on utterance length (samples)
const MAX_UTTERANCE_SAMPLES: usize = 240_000; // 15 seconds

/// Endpointing progress after a chunk of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Still waiting for the utterance to start or finish
    Pending,
    /// A complete utterance is buffered
    Complete,
    /// Nothing was said within the initial-silence window
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Speaking,
}

/// Detects the boundaries of a single utterance
#[derive(Debug)]
pub struct UtteranceDetector {
    state: State,
    samples: Vec<f32>,
    trailing_silence: usize,
    leading_silence: usize,
}

impl UtteranceDetector {
    /// Create a detector waiting for speech
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            samples: Vec::new(),
            trailing_silence: 0,
            leading_silence: 0,
        }
    }

    /// Feed a chunk of samples and report endpointing progress
    pub fn push(&mut self, chunk: &[f32]) -> Endpoint {
        let is_speech = rms(chunk) > ENERGY_THRESHOLD;

        match self.state {
            State::Idle => {
                if is_speech {
                    self.state = State::Speaking;
                    self.samples.extend_from_slice(chunk);
                    self.trailing_silence = 0;
                    tracing::trace!(buffered = self.samples.len(), "speech started");
                } else {
                    self.leading_silence += chunk.len();
                    if self.leading_silence > INITIAL_SILENCE_SAMPLES {
                        tracing::debug!("initial silence window elapsed");
                        return Endpoint::TimedOut;
                    }
                }
            }
            State::Speaking => {
                self.samples.extend_from_slice(chunk);

                if is_speech {
                    self.trailing_silence = 0;
                } else {
                    self.trailing_silence += chunk.len();
                }

                if self.trailing_silence > TRAILING_SILENCE_SAMPLES {
                    if self.samples.len() > MIN_SPEECH_SAMPLES + self.trailing_silence {
                        tracing::debug!(samples = self.samples.len(), "utterance complete");
                        return Endpoint::Complete;
                    }
                    // A blip too short to transcribe; keep waiting for real speech
                    self.state = State::Idle;
                    self.samples.clear();
                    self.trailing_silence = 0;
                }

                if self.samples.len() > MAX_UTTERANCE_SAMPLES {
                    tracing::debug!(samples = self.samples.len(), "utterance length cap reached");
                    return Endpoint::Complete;
                }
            }
        }

        Endpoint::Pending
    }

    /// Take the buffered utterance, leaving the detector empty
    pub fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS energy of a chunk of samples
#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        let silence = vec![0.0f32; 100];
        assert!(rms(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(rms(&loud) > 0.4);
    }

    #[test]
    fn speech_then_silence_completes() {
        let mut detector = UtteranceDetector::new();

        let speech = vec![0.3f32; MIN_SPEECH_SAMPLES + 1600];
        assert_eq!(detector.push(&speech), Endpoint::Pending);

        let silence = vec![0.0f32; TRAILING_SILENCE_SAMPLES + 1600];
        assert_eq!(detector.push(&silence), Endpoint::Complete);
        assert!(!detector.take_samples().is_empty());
    }

    #[test]
    fn pure_silence_times_out() {
        let mut detector = UtteranceDetector::new();

        let chunk = vec![0.0f32; 16_000];
        for _ in 0..5 {
            assert_eq!(detector.push(&chunk), Endpoint::Pending);
        }
        assert_eq!(detector.push(&chunk), Endpoint::TimedOut);
    }
}
