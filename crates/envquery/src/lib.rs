#![forbid(unsafe_code)]
//! Turns loosely-shaped agent responses into typed environment-variable results.
//!
//! The agent answering an environment-variable query does not have a fixed wire
//! contract: the `variables` list may sit directly under `response.result`, be
//! stringified JSON under a wrapper key, hide inside a `raw_response` echo, or
//! be missing entirely. This crate provides:
//! - [`coerce`]: parse a string that looks like a JSON object/array, otherwise pass it through.
//! - [`extract`]: find a `variables`-bearing object directly or under well-known wrapper keys.
//! - [`normalize`]: run the ordered extraction strategies over an [`AgentEnvelope`] and build a
//!   [`NormalizedResult`], or return `None` when nothing usable is present.
//! - [`QueryOutcome`]: found / no-match / failed classification with the error text to surface.
//! - [`QueryHistory`] and [`JsonFileHistoryStore`]: a bounded query log and its persistence.
//! - [`QuerySession`]: the submit flow over a black-box [`AgentTransport`].
//!
//! ```rust
//! use envquery::{normalize, AgentEnvelope, Confidence};
//! use serde_json::json;
//!
//! let envelope = AgentEnvelope::new(json!({
//!     "success": true,
//!     "response": {"result": "{\"variables\":[{\"name\":\"DB_URL\"}]}"},
//! }));
//! let result = normalize(&envelope).expect("variables present");
//! assert_eq!(result.variables[0].name, "DB_URL");
//! assert_eq!(result.variables[0].value, "not set");
//! assert_eq!(result.variables[0].confidence, Confidence::Low);
//! ```

mod coerce;
mod envelope;
mod error;
mod extract;
mod history;
mod normalize;
mod outcome;
mod record;
mod session;

pub use coerce::{coerce, is_target_shape};
pub use envelope::AgentEnvelope;
pub use error::{HistoryError, SessionError, TransportError};
pub use extract::{extract, CANDIDATE_KEYS};
pub use history::{
    HistoryStore, JsonFileHistoryStore, QueryHistory, QueryHistoryItem, DEFAULT_HISTORY_CAPACITY,
};
pub use normalize::{
    deep_string_scan, locate, normalize, primary_result, raw_response, response_level, Strategy,
    RAW_RESPONSE_MAX_DEPTH, STRATEGIES,
};
pub use outcome::{
    FailureKind, QueryFailure, QueryOutcome, GENERIC_SHAPE_MISS, GENERIC_TRANSPORT_ERROR,
};
pub use record::{Confidence, NormalizedResult, VariableRecord, VALUE_NOT_SET};
pub use session::{AgentTransport, QuerySession, SessionConfig};
