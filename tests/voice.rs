//! Voice pipeline integration tests
//!
//! Tests endpointing and WAV encoding without requiring audio hardware

use std::io::Cursor;

use lumen_gateway::voice::{Endpoint, SAMPLE_RATE, UtteranceDetector, samples_to_wav};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[test]
fn silence_keeps_the_detector_pending() {
    let mut detector = UtteranceDetector::new();

    let silence = generate_silence(0.5);
    assert_eq!(detector.push(&silence), Endpoint::Pending);
    assert_eq!(detector.push(&silence), Endpoint::Pending);
}

#[test]
fn speech_followed_by_silence_completes() {
    let mut detector = UtteranceDetector::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert_eq!(detector.push(&speech), Endpoint::Pending);

    let more_speech = generate_sine_samples(440.0, 0.3, 0.3);
    assert_eq!(detector.push(&more_speech), Endpoint::Pending);

    let silence = generate_silence(0.6);
    assert_eq!(detector.push(&silence), Endpoint::Complete);
}

#[test]
fn completed_utterance_contains_all_chunks() {
    let mut detector = UtteranceDetector::new();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    detector.push(&speech);

    let silence = generate_silence(0.6);
    detector.push(&silence);

    let samples = detector.take_samples();
    assert_eq!(samples.len(), speech.len() + silence.len());

    // Taking the buffer leaves the detector empty
    assert!(detector.take_samples().is_empty());
}

#[test]
fn short_blip_does_not_complete() {
    let mut detector = UtteranceDetector::new();

    let blip = generate_sine_samples(440.0, 0.1, 0.3);
    assert_eq!(detector.push(&blip), Endpoint::Pending);

    let silence = generate_silence(0.6);
    assert_eq!(detector.push(&silence), Endpoint::Pending);
}

#[test]
fn pure_initial_silence_times_out() {
    let mut detector = UtteranceDetector::new();

    let silence = generate_silence(1.0);
    let mut last = Endpoint::Pending;
    for _ in 0..6 {
        last = detector.push(&silence);
    }
    assert_eq!(last, Endpoint::TimedOut);
}

#[test]
fn leading_silence_before_speech_still_completes() {
    let mut detector = UtteranceDetector::new();

    let silence = generate_silence(1.0);
    assert_eq!(detector.push(&silence), Endpoint::Pending);

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert_eq!(detector.push(&speech), Endpoint::Pending);

    let trailing = generate_silence(0.6);
    assert_eq!(detector.push(&trailing), Endpoint::Complete);
}

#[test]
fn samples_to_wav_writes_riff_header() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");

    // WAV should have reasonable size
    assert!(wav_data.len() > 44); // WAV header is 44 bytes
}

#[test]
fn wav_roundtrip_preserves_spec_and_length() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let cursor = Cursor::new(wav_data);
    let mut reader = hound::WavReader::new(cursor).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}
