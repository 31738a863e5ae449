use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used when the agent returns a variable without a value.
pub const VALUE_NOT_SET: &str = "not set";

const INTERPRETATION_KEYS: &[&str] = &["query_interpretation", "queryInterpretation", "interpretation"];
const TOTAL_FOUND_KEYS: &[&str] = &["total_found", "totalFound"];

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    /// Maps `"high"`, `"medium"` and `"low"`; every other value is `Low`.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("high") => Self::High,
            Some("medium") => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Ordering weight: high > medium > low.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    pub value: String,
    pub confidence: Confidence,
}

impl VariableRecord {
    /// Repairs a single loosely-shaped record; never rejects it.
    pub fn from_value(raw: &Value) -> Self {
        let empty = Map::new();
        let obj = raw.as_object().unwrap_or(&empty);
        Self {
            name: text_or(obj.get("name"), ""),
            value: text_or(obj.get("value"), VALUE_NOT_SET),
            confidence: Confidence::from_value(obj.get("confidence")),
        }
    }
}

/// Canonical, fully-typed view of an agent answer.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub query_interpretation: String,
    pub variables: Vec<VariableRecord>,
    pub total_found: u64,
    pub message: String,
}

impl NormalizedResult {
    /// Builds the result from a target-shaped object, defaulting every missing field.
    pub fn from_target(found: &Value) -> Self {
        let variables: Vec<VariableRecord> = found
            .get("variables")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(VariableRecord::from_value).collect())
            .unwrap_or_default();
        let total_found = TOTAL_FOUND_KEYS
            .iter()
            .find_map(|key| found.get(*key).and_then(as_count))
            .unwrap_or(variables.len() as u64);
        Self {
            query_interpretation: INTERPRETATION_KEYS
                .iter()
                .find_map(|key| found.get(*key).filter(|v| !v.is_null()))
                .map(|v| text_or(Some(v), ""))
                .unwrap_or_default(),
            variables,
            total_found,
            message: text_or(found.get("message"), ""),
        }
    }

    /// True when there is something worth showing: at least one variable or a message.
    pub fn has_content(&self) -> bool {
        !self.variables.is_empty() || !self.message.is_empty()
    }
}

/// Largest float that still converts to an exact integer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64().filter(|_| n.is_f64()) {
            Some(f) if is_integral(f) => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Non-negative integer counts, including integral floats such as `2.0`.
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && is_integral(*f))
            .map(|f| f as u64)
    })
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT
}
