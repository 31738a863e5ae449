use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by an [`AgentTransport`](crate::AgentTransport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("agent request failed: {0}")]
    Request(String),
    #[error("agent request timed out after {timeout:?}")]
    Timeout { timeout: std::time::Duration },
    #[error("agent returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history from `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write history to `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse history `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum SessionError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("a query is already in flight")]
    Busy,
}
