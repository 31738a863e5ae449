use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::AgentEnvelope;
use crate::error::{SessionError, TransportError};
use crate::history::{QueryHistory, QueryHistoryItem, DEFAULT_HISTORY_CAPACITY};
use crate::outcome::QueryOutcome;

/// The black-box agent call: one query in, one envelope out.
pub trait AgentTransport {
    fn request(
        &self,
        query: &str,
        agent_id: &str,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    pub agent_id: String,
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            agent_id: "default".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Submits queries through a transport, normalizes the answers and keeps history.
///
/// Only one query may be outstanding at a time; a second `submit` while one is
/// pending fails with [`SessionError::Busy`].
pub struct QuerySession<T> {
    transport: T,
    config: SessionConfig,
    history: Mutex<QueryHistory>,
    in_flight: AtomicBool,
}

impl<T: AgentTransport> QuerySession<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let history = QueryHistory::with_capacity(config.history_capacity);
        Self {
            transport,
            config,
            history: Mutex::new(history),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(&self, query: &str) -> Result<QueryOutcome, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SessionError::Busy)?;

        let envelope = match self.transport.request(query, &self.config.agent_id).await {
            Ok(value) => AgentEnvelope::new(value),
            Err(err) => {
                warn!(agent_id = %self.config.agent_id, error = %err, "agent request failed");
                AgentEnvelope::failure(err.to_string())
            }
        };

        let outcome = QueryOutcome::from_envelope(&envelope);
        match &outcome {
            QueryOutcome::Found(result) => {
                debug!(variables = result.variables.len(), "query returned results");
                self.lock_history()
                    .push(QueryHistoryItem::new(query, result.variables.len()));
            }
            QueryOutcome::NoMatch(_) => debug!("query returned no matching variables"),
            QueryOutcome::Failed(failure) => {
                debug!(kind = ?failure.kind, error = %failure.error, "query failed")
            }
        }
        Ok(outcome)
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> QueryHistory {
        self.lock_history().clone()
    }

    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    /// Replaces the history with previously persisted items.
    pub fn restore_history(&self, items: impl IntoIterator<Item = QueryHistoryItem>) {
        *self.lock_history() = QueryHistory::from_items(self.config.history_capacity, items);
    }

    fn lock_history(&self) -> MutexGuard<'_, QueryHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
