use std::{io, path::PathBuf};

use envquery::{HistoryError, SessionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config `{path}`: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config `{path}`: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("no agent command configured; add an [agent] table with `command` to envquery.toml")]
    MissingAgentCommand,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("{0}")]
    QueryFailed(String),
}
