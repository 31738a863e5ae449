use serde_json::Value;

use crate::coerce::{coerce, is_target_shape};

/// Wrapper keys checked for an embedded result, in priority order.
pub const CANDIDATE_KEYS: &[&str] = &["text", "response", "result", "data", "content", "output"];

/// Looks for a target-shaped object in `value` or directly under one of [`CANDIDATE_KEYS`].
///
/// Each candidate is passed through [`coerce`] before its shape is tested, so
/// stringified JSON under a wrapper key is found too. The first matching key wins.
/// Returns `None` when `value` is not an object or nothing matches.
pub fn extract(value: &Value) -> Option<Value> {
    let obj = value.as_object()?;
    if is_target_shape(value) {
        return Some(value.clone());
    }
    CANDIDATE_KEYS.iter().find_map(|key| {
        let candidate = coerce(obj.get(*key)?);
        is_target_shape(&candidate).then_some(candidate)
    })
}
