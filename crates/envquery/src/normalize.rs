//! Locates the `variables` payload inside an agent envelope.
//!
//! Agents are inconsistent about where they put their answer: directly under
//! `response.result`, as stringified JSON under some wrapper key, inside the
//! `raw_response` echo, or buried in an arbitrary string field. Each location
//! is tried by one strategy; the first strategy to find a target-shaped object wins.

use serde_json::Value;
use tracing::debug;

use crate::coerce::{coerce, is_target_shape};
use crate::envelope::AgentEnvelope;
use crate::extract::extract;
use crate::record::NormalizedResult;

/// Upper bound on how many nested `response` layers of the raw echo are unwrapped.
pub const RAW_RESPONSE_MAX_DEPTH: usize = 3;

/// Marker searched for by the last-resort string scan.
const VARIABLES_MARKER: &str = "variables";

/// One extraction attempt against a specific location in the envelope.
pub type Strategy = fn(&AgentEnvelope) -> Option<Value>;

/// Strategies in the order they are tried.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("primary_result", primary_result),
    ("response_level", response_level),
    ("raw_response", raw_response),
    ("deep_string_scan", deep_string_scan),
];

/// Normalizes an envelope into a typed result.
///
/// Returns `None` when the call failed, the envelope has no `response`, or no
/// strategy locates a `variables` list. Never panics on malformed input.
pub fn normalize(envelope: &AgentEnvelope) -> Option<NormalizedResult> {
    let (name, found) = locate_with_strategy(envelope)?;
    debug!(strategy = name, "located variables payload");
    Some(NormalizedResult::from_target(&found))
}

/// Returns the target-shaped object located by the first successful strategy.
pub fn locate(envelope: &AgentEnvelope) -> Option<Value> {
    locate_with_strategy(envelope).map(|(_, found)| found)
}

fn locate_with_strategy(envelope: &AgentEnvelope) -> Option<(&'static str, Value)> {
    if !envelope.success() || envelope.response().is_none() {
        return None;
    }
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| strategy(envelope).map(|found| (*name, found)))
}

/// `response.result`, coerced, then searched through the wrapper keys.
pub fn primary_result(envelope: &AgentEnvelope) -> Option<Value> {
    let coerced = coerce(envelope.result()?);
    if is_target_shape(&coerced) {
        return Some(coerced);
    }
    extract(&coerced)
}

/// `response` itself, or the uncoerced `response.result` object searched through the wrapper keys.
pub fn response_level(envelope: &AgentEnvelope) -> Option<Value> {
    let response = envelope.response()?;
    if is_target_shape(response) {
        return Some(response.clone());
    }
    envelope
        .result()
        .filter(|result| result.is_object())
        .and_then(extract)
}

/// Unwraps the `raw_response` echo, following nested `response` fields a bounded number of times.
pub fn raw_response(envelope: &AgentEnvelope) -> Option<Value> {
    let mut current = coerce(envelope.raw_response()?);
    for _ in 0..RAW_RESPONSE_MAX_DEPTH {
        if is_target_shape(&current) {
            return Some(current);
        }
        match current.get("response").map(coerce) {
            Some(inner) if is_target_shape(&inner) => return Some(inner),
            Some(inner) => current = inner,
            None => return extract(&current),
        }
    }
    None
}

/// Last resort: any string field of `response.result` that mentions `variables` and parses to the target shape.
///
/// Fields are visited in source order. This is deliberately permissive; prose
/// that merely mentions the word is attempted and rejected by the shape test.
pub fn deep_string_scan(envelope: &AgentEnvelope) -> Option<Value> {
    envelope
        .result()?
        .as_object()?
        .values()
        .filter(|value| value.as_str().is_some_and(|s| s.contains(VARIABLES_MARKER)))
        .map(coerce)
        .find(is_target_shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(value: Value) -> AgentEnvelope {
        AgentEnvelope::new(value)
    }

    #[test]
    fn failed_or_empty_envelopes_are_absent() {
        assert_eq!(normalize(&env(json!({"success": false, "error": "timeout"}))), None);
        assert_eq!(normalize(&env(json!({"success": true}))), None);
        assert_eq!(normalize(&env(json!({"success": true, "response": {"result": {}}}))), None);
        assert_eq!(
            normalize(&env(json!({
                "success": false,
                "response": {"result": {"variables": [{"name": "A"}]}},
            }))),
            None
        );
    }

    #[test]
    fn primary_result_handles_wrapped_string() {
        let e = env(json!({
            "success": true,
            "response": {"result": {"text": "{\"variables\": [{\"name\": \"A\"}]}"}},
        }));
        assert!(primary_result(&e).is_some());
    }

    #[test]
    fn response_level_accepts_variables_on_response() {
        let e = env(json!({
            "success": true,
            "response": {"variables": [{"name": "TOP"}], "result": "nothing here"},
        }));
        assert_eq!(primary_result(&e), None);
        let r = normalize(&e).unwrap();
        assert_eq!(r.variables[0].name, "TOP");
    }

    #[test]
    fn raw_response_unwraps_nested_echoes() {
        let inner = json!({"variables": [{"name": "RAW", "value": "1"}]}).to_string();
        let middle = json!({"response": inner}).to_string();
        let e = env(json!({
            "success": true,
            "response": {"result": "no json"},
            "raw_response": {"response": middle},
        }));
        let r = normalize(&e).unwrap();
        assert_eq!(r.variables[0].name, "RAW");
        assert_eq!(r.variables[0].value, "1");
    }

    #[test]
    fn raw_response_falls_back_to_wrapper_keys() {
        let e = env(json!({
            "success": true,
            "response": {"result": null},
            "raw_response": {"output": "{\"variables\": [{\"name\": \"OUT\"}]}"},
        }));
        assert_eq!(normalize(&e).unwrap().variables[0].name, "OUT");
    }

    #[test]
    fn raw_response_depth_is_bounded() {
        let mut nested = json!({"variables": [{"name": "DEEP"}]});
        for _ in 0..6 {
            nested = json!({"response": nested.to_string()});
        }
        let e = env(json!({
            "success": true,
            "response": {"result": {}},
            "raw_response": nested,
        }));
        assert_eq!(raw_response(&e), None);
        assert_eq!(normalize(&e), None);
    }

    #[test]
    fn raw_response_within_bound_is_found() {
        let mut nested = json!({"variables": [{"name": "NEAR"}]});
        for _ in 0..2 {
            nested = json!({"response": nested.to_string()});
        }
        let e = env(json!({
            "success": true,
            "response": {"result": {}},
            "raw_response": nested,
        }));
        assert_eq!(normalize(&e).unwrap().variables[0].name, "NEAR");
    }

    #[test]
    fn deep_scan_finds_json_in_unlisted_field() {
        let e = env(json!({
            "success": true,
            "response": {"result": {
                "notes": "variables are listed below",
                "answer": "{\"variables\": [{\"name\": \"SCAN\"}]}",
            }},
        }));
        assert_eq!(primary_result(&e), None);
        assert_eq!(response_level(&e), None);
        assert_eq!(normalize(&e).unwrap().variables[0].name, "SCAN");
    }

    #[test]
    fn deep_scan_takes_first_payload_in_source_order() {
        let result: Value = serde_json::from_str(
            r#"{
                "zeta": "{\"variables\":[{\"name\":\"FIRST_IN_SOURCE\"}]}",
                "alpha": "{\"variables\":[{\"name\":\"SECOND_IN_SOURCE\"}]}"
            }"#,
        )
        .unwrap();
        let e = env(json!({"success": true, "response": {"result": result}}));
        assert_eq!(normalize(&e).unwrap().variables[0].name, "FIRST_IN_SOURCE");
    }

    #[test]
    fn deep_scan_ignores_prose_mentions() {
        let e = env(json!({
            "success": true,
            "response": {"result": {"summary": "I found no variables"}},
        }));
        assert_eq!(normalize(&e), None);
    }

    #[test]
    fn locate_returns_raw_target() {
        let e = env(json!({
            "success": true,
            "response": {"result": {"variables": [], "message": "none"}},
        }));
        assert_eq!(locate(&e), Some(json!({"variables": [], "message": "none"})));
    }
}
