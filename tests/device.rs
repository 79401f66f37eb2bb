//! Command body construction tests
//!
//! The dispatcher's mapping from a prediction to the `{color: intent}`
//! device body, covered without any network

use std::collections::BTreeMap;

use lumen_gateway::device::build_command_body;
use lumen_gateway::nlu::Prediction;
use serde_json::json;

/// Build a prediction with the given top intent and entity map
fn prediction(top_intent: &str, entities: serde_json::Value) -> Prediction {
    Prediction {
        top_intent: top_intent.to_string(),
        intents: BTreeMap::new(),
        entities: serde_json::from_value(entities).unwrap(),
    }
}

#[test]
fn missing_led_entity_builds_no_body() {
    let prediction = prediction("TurnOn", json!({}));
    assert!(build_command_body(&prediction).is_none());
}

#[test]
fn other_entities_alone_build_no_body() {
    let prediction = prediction("TurnOn", json!({"Room": [["kitchen"]]}));
    assert!(build_command_body(&prediction).is_none());
}

#[test]
fn each_led_gets_the_top_intent() {
    let prediction = prediction("TurnOn", json!({"LED": [["red"], ["blue"]]}));

    let body = build_command_body(&prediction).unwrap();
    assert_eq!(body.len(), 2);
    assert_eq!(body["red"], "TurnOn");
    assert_eq!(body["blue"], "TurnOn");
}

#[test]
fn duplicate_color_collapses_to_one_entry() {
    let prediction = prediction("TurnOff", json!({"LED": [["red"], ["red"]]}));

    let body = build_command_body(&prediction).unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body["red"], "TurnOff");
}

#[test]
fn empty_led_list_builds_empty_body() {
    let prediction = prediction("TurnOn", json!({"LED": []}));

    let body = build_command_body(&prediction).unwrap();
    assert!(body.is_empty());
}

#[test]
fn led_value_without_fields_is_skipped() {
    let prediction = prediction("Blink", json!({"LED": [[], ["green"]]}));

    let body = build_command_body(&prediction).unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body["green"], "Blink");
}

#[test]
fn body_serializes_to_flat_json() {
    let prediction = prediction("TurnOn", json!({"LED": [["red"], ["blue"]]}));

    let body = build_command_body(&prediction).unwrap();
    let serialized = serde_json::to_string(&body).unwrap();
    assert_eq!(serialized, r#"{"blue":"TurnOn","red":"TurnOn"}"#);
}
