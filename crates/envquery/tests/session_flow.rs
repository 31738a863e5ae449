use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use envquery::{
    AgentTransport, FailureKind, QueryHistoryItem, QueryOutcome, QuerySession, SessionConfig,
    SessionError, TransportError,
};
use serde_json::{json, Value};
use tokio::sync::Notify;

struct StaticTransport {
    response: Value,
    calls: AtomicUsize,
}

impl StaticTransport {
    fn new(response: Value) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AgentTransport for StaticTransport {
    async fn request(&self, _query: &str, _agent_id: &str) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

struct TimeoutTransport;

impl AgentTransport for TimeoutTransport {
    async fn request(&self, _query: &str, _agent_id: &str) -> Result<Value, TransportError> {
        Err(TransportError::Timeout {
            timeout: Duration::from_secs(5),
        })
    }
}

struct GatedTransport {
    gate: Arc<Notify>,
}

impl AgentTransport for GatedTransport {
    async fn request(&self, _query: &str, agent_id: &str) -> Result<Value, TransportError> {
        self.gate.notified().await;
        Ok(json!({
            "success": true,
            "response": {"result": {"variables": [{"name": "AGENT", "value": agent_id}]}},
        }))
    }
}

fn found_response() -> Value {
    json!({
        "success": true,
        "response": {"result": {"variables": [
            {"name": "PORT", "value": "8080", "confidence": "high"},
            {"name": "HOST", "value": "0.0.0.0", "confidence": "medium"},
        ]}},
    })
}

#[tokio::test]
async fn found_results_are_recorded_in_history() {
    let session = QuerySession::new(StaticTransport::new(found_response()), SessionConfig::default());

    let outcome = session.submit("  network settings  ").await.unwrap();
    assert!(matches!(outcome, QueryOutcome::Found(_)));

    let history = session.history();
    assert_eq!(history.len(), 1);
    let item = history.iter().next().unwrap();
    assert_eq!(item.query, "network settings");
    assert_eq!(item.result_count, 2);
}

#[tokio::test]
async fn no_match_and_failures_are_not_recorded() {
    let session = QuerySession::new(
        StaticTransport::new(json!({"success": true, "response": {"result": {"variables": []}}})),
        SessionConfig::default(),
    );
    let outcome = session.submit("anything").await.unwrap();
    assert!(matches!(outcome, QueryOutcome::NoMatch(_)));
    assert!(session.history().is_empty());

    let session = QuerySession::new(TimeoutTransport, SessionConfig::default());
    match session.submit("anything").await.unwrap() {
        QueryOutcome::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Transport);
            assert!(failure.error.contains("timed out"), "{}", failure.error);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn empty_query_is_rejected_without_calling_agent() {
    let session = QuerySession::new(StaticTransport::new(found_response()), SessionConfig::default());
    assert_eq!(session.submit("   ").await.unwrap_err(), SessionError::EmptyQuery);
    assert_eq!(session.transport().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_busy() {
    let gate = Arc::new(Notify::new());
    let session = QuerySession::new(
        GatedTransport { gate: gate.clone() },
        SessionConfig {
            agent_id: "env-agent".to_string(),
            ..SessionConfig::default()
        },
    );

    let first = session.submit("first");
    let second = async {
        tokio::task::yield_now().await;
        let result = session.submit("second").await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap_err(), SessionError::Busy);
    let QueryOutcome::Found(result) = first.unwrap() else {
        panic!("expected found");
    };
    assert_eq!(result.variables[0].value, "env-agent");
    assert!(!session.is_busy());
}

#[tokio::test]
async fn history_respects_configured_capacity() {
    let session = QuerySession::new(
        StaticTransport::new(found_response()),
        SessionConfig {
            history_capacity: 2,
            ..SessionConfig::default()
        },
    );
    session.restore_history(vec![QueryHistoryItem::new("old", 1)]);
    for q in ["a", "b"] {
        session.submit(q).await.unwrap();
    }
    let queries: Vec<_> = session.history().recent().map(|i| i.query.clone()).collect();
    assert_eq!(queries, ["b", "a"]);

    session.clear_history();
    assert!(session.history().is_empty());
}
