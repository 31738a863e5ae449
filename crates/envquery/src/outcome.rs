use std::fmt;

use crate::envelope::AgentEnvelope;
use crate::normalize::normalize;
use crate::record::NormalizedResult;

pub const GENERIC_TRANSPORT_ERROR: &str = "Failed to get a response from the agent";
pub const GENERIC_SHAPE_MISS: &str = "No variables found in the agent response";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FailureKind {
    /// The agent call itself reported failure.
    Transport,
    /// The call succeeded but no `variables` list could be located.
    ShapeMiss,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct QueryFailure {
    pub kind: FailureKind,
    pub error: String,
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

/// What a caller should do with a normalized envelope.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum QueryOutcome {
    /// Variables or a message were returned; worth recording in history.
    Found(NormalizedResult),
    /// Well-formed but empty answer.
    NoMatch(NormalizedResult),
    Failed(QueryFailure),
}

impl QueryOutcome {
    pub fn from_envelope(envelope: &AgentEnvelope) -> Self {
        match normalize(envelope) {
            Some(result) if result.has_content() => Self::Found(result),
            Some(result) => Self::NoMatch(result),
            None => Self::Failed(failure_for(envelope)),
        }
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        match self {
            Self::Found(result) | Self::NoMatch(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    pub fn is_recordable(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

fn failure_for(envelope: &AgentEnvelope) -> QueryFailure {
    let kind = if envelope.success() {
        FailureKind::ShapeMiss
    } else {
        FailureKind::Transport
    };
    let fallback = match kind {
        FailureKind::Transport => GENERIC_TRANSPORT_ERROR,
        FailureKind::ShapeMiss => GENERIC_SHAPE_MISS,
    };
    let error = envelope
        .error()
        .filter(|e| !e.is_empty())
        .or_else(|| envelope.response_message().filter(|m| !m.is_empty()))
        .unwrap_or(fallback)
        .to_string();
    QueryFailure { kind, error }
}
