use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use envquery::{AgentTransport, TransportError};
use serde_json::{json, Value};
use tokio::{io::AsyncWriteExt, process::Command, time};
use tracing::debug;

use crate::config::AgentCommandConfig;

/// Runs an external agent program once per query.
///
/// The request `{"query": ..., "agent_id": ...}` is written to stdin; stdout
/// must hold a single JSON envelope. No retries.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Some(Duration::from_secs(120)),
        }
    }

    pub fn from_config(config: &AgentCommandConfig) -> Self {
        Self::new(config.command.clone())
            .args(config.args.iter().cloned())
            .timeout(config.timeout())
    }

    pub fn args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, request: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| {
            TransportError::Request(format!(
                "failed to spawn `{}`: {source}",
                self.program.display()
            ))
        })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&request)
                .await
                .map_err(|e| TransportError::Request(format!("failed writing stdin: {e}")))?;
        }

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(timeout) => time::timeout(timeout, wait)
                .await
                .map_err(|_| TransportError::Timeout { timeout })?,
            None => wait.await,
        }
        .map_err(|e| TransportError::Request(format!("failed waiting for agent: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Request(format!(
                "agent exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl AgentTransport for CommandTransport {
    async fn request(&self, query: &str, agent_id: &str) -> Result<Value, TransportError> {
        debug!(program = %self.program.display(), agent_id, "invoking agent command");
        let request = serde_json::to_vec(&json!({ "query": query, "agent_id": agent_id }))?;
        let stdout = self.run(request).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }
}
