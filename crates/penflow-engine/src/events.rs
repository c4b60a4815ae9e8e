//! Evaluation progress events
//!
//! The engine reports what it computed, reused, or failed on through an
//! [`EventSink`], so editors can mark nodes inline without polling.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Receiver for evaluation events
pub trait EventSink: Send + Sync {
    /// Deliver an event
    ///
    /// Returns an error if the receiver is gone; the engine logs it and
    /// keeps evaluating.
    fn send(&self, event: EvaluationEvent) -> Result<(), EventError>;
}

/// Error when delivering an event fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted during one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EvaluationEvent {
    #[serde(rename_all = "camelCase")]
    EvaluationStarted {
        graph_id: String,
        execution_id: String,
    },

    /// A node produced output, either freshly or from the persistent cache
    #[serde(rename_all = "camelCase")]
    NodeEvaluated {
        node_id: String,
        execution_id: String,
        path_count: usize,
        cached: bool,
    },

    /// A node failed locally; its output is empty
    #[serde(rename_all = "camelCase")]
    NodeFailed {
        node_id: String,
        execution_id: String,
        error: String,
    },

    #[serde(rename_all = "camelCase")]
    EvaluationCompleted {
        graph_id: String,
        execution_id: String,
        path_count: usize,
    },

    /// The run aborted as a whole
    #[serde(rename_all = "camelCase")]
    EvaluationFailed {
        graph_id: String,
        execution_id: String,
        error: String,
    },
}

impl EvaluationEvent {
    pub fn node_evaluated(node_id: &str, execution_id: &str, path_count: usize, cached: bool) -> Self {
        Self::NodeEvaluated {
            node_id: node_id.to_string(),
            execution_id: execution_id.to_string(),
            path_count,
            cached,
        }
    }

    pub fn node_failed(node_id: &str, execution_id: &str, error: impl Into<String>) -> Self {
        Self::NodeFailed {
            node_id: node_id.to_string(),
            execution_id: execution_id.to_string(),
            error: error.into(),
        }
    }
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EvaluationEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A sink that collects events in memory
///
/// Useful for hosts that render a run's log after the fact, and for tests.
pub struct VecEventSink {
    events: Mutex<Vec<EvaluationEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<EvaluationEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EvaluationEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink() {
        let sink = VecEventSink::new();
        sink.send(EvaluationEvent::node_evaluated("n1", "exec1", 3, true))
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            EvaluationEvent::NodeEvaluated { node_id, cached, .. } => {
                assert_eq!(node_id, "n1");
                assert!(*cached);
            }
            _ => panic!("Expected NodeEvaluated event"),
        }

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serializes_tagged_camel_case() {
        let json = serde_json::to_value(EvaluationEvent::node_failed("n1", "exec1", "bad"))
            .unwrap();
        assert_eq!(json["type"], "nodeFailed");
        assert_eq!(json["nodeId"], "n1");
        assert_eq!(json["executionId"], "exec1");
    }

    #[test]
    fn test_null_event_sink() {
        NullEventSink
            .send(EvaluationEvent::node_evaluated("n1", "exec1", 0, false))
            .unwrap();
    }
}
