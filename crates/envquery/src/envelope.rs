use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Raw response returned by the agent call, before normalization.
///
/// The wire shape is loose: only `success`, `error`, `response` and
/// `raw_response` are ever consulted, and any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentEnvelope(pub Value);

impl AgentEnvelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Envelope describing a failed agent call.
    pub fn failure(error: impl Into<String>) -> Self {
        Self(json!({ "success": false, "error": error.into() }))
    }

    /// Only a literal `true` counts as success.
    pub fn success(&self) -> bool {
        self.0.get("success").and_then(Value::as_bool) == Some(true)
    }

    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    /// The `response` object; `null` counts as missing.
    pub fn response(&self) -> Option<&Value> {
        self.0.get("response").filter(|v| !v.is_null())
    }

    pub fn result(&self) -> Option<&Value> {
        self.response()?.get("result")
    }

    pub fn response_message(&self) -> Option<&str> {
        self.response()?.get("message").and_then(Value::as_str)
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.0.get("raw_response")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for AgentEnvelope {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
