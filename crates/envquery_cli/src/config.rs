use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use envquery::{SessionConfig, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const CONFIG_FILE_NAME: &str = "envquery.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default)]
    pub agent: Option<AgentCommandConfig>,
}

/// External program that answers queries: reads a JSON request on stdin, prints an envelope on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentCommandConfig {
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AgentCommandConfig {
    /// `0` disables the timeout.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            agent_id: default_agent_id(),
            history_capacity: default_history_capacity(),
            history_path: default_history_path(),
            agent: None,
        }
    }
}

fn default_agent_id() -> String {
    "default".to_string()
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_history_path() -> PathBuf {
    PathBuf::from(".envquery").join("history.json")
}

fn default_timeout_secs() -> u64 {
    120
}

impl CliConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            agent_id: self.agent_id.clone(),
            history_capacity: self.history_capacity,
        }
    }

    fn validate(self) -> Result<Self, Error> {
        if self.history_capacity == 0 {
            return Err(Error::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.agent_id.trim().is_empty() {
            return Err(Error::InvalidConfig("agent_id must not be empty".to_string()));
        }
        Ok(self)
    }
}

pub fn parse(text: &str, path: &Path) -> Result<CliConfig, Error> {
    let cfg: CliConfig = toml::from_str(text).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()
}

/// Loads `explicit` if given (it must exist), else `envquery.toml` under `dir` when present, else defaults.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<CliConfig, Error> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = dir.join(CONFIG_FILE_NAME);
            if !p.exists() {
                return Ok(CliConfig::default());
            }
            p
        }
    };
    let text = fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;
    parse(&text, &path)
}
