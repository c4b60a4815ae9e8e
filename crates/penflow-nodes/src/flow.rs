//! Top-level flow execution
//!
//! `execute_flow` is the boundary hosts call. Nothing escapes it: node
//! failures are reported per node, and anything that unwinds out of the
//! engine is caught and turned into an unsuccessful [`FlowResult`].

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use penflow_engine::{
    ColoredPath, DemandEngine, EngineConfig, EvaluationEvent, EvaluationStats, EventSink,
    GeometryCache, NodeExecutor, NodeId, NullEventSink, PlotGraph,
};

use crate::executor::CoreNodeExecutor;

/// Failures that abort a whole flow
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Evaluation panicked: {0}")]
    Panicked(String),
}

/// What a host receives for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub success: bool,
    pub paths: Vec<ColoredPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_errors: BTreeMap<NodeId, String>,
    pub stats: EvaluationStats,
}

impl FlowResult {
    fn aborted(error: FlowError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// A reusable evaluator bound to one executor and configuration
///
/// Keeping a `Flow` alive across runs also keeps its decoded rasters.
pub struct Flow {
    engine: DemandEngine,
    event_sink: Arc<dyn EventSink>,
}

impl Flow {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_executor(Arc::new(CoreNodeExecutor::new()), config)
    }

    pub fn with_executor(executor: Arc<dyn NodeExecutor>, config: EngineConfig) -> Self {
        Self {
            engine: DemandEngine::new(executor).with_config(config),
            event_sink: Arc::new(NullEventSink),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.engine = self.engine.with_event_sink(Arc::clone(&event_sink));
        self.event_sink = event_sink;
        self
    }

    /// Evaluate `graph`, reusing and refreshing `cache` when given
    pub fn run(&mut self, graph: &PlotGraph, cache: Option<&mut GeometryCache>) -> FlowResult {
        let engine = &mut self.engine;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.evaluate(graph, cache)));
        match outcome {
            Ok(result) => FlowResult {
                success: true,
                paths: result.paths,
                error: None,
                node_errors: result.node_errors,
                stats: result.stats,
            },
            Err(payload) => {
                let error = FlowError::Panicked(panic_message(payload.as_ref()));
                log::error!("Flow '{}' aborted: {}", graph.id, error);
                let event = EvaluationEvent::EvaluationFailed {
                    graph_id: graph.id.clone(),
                    execution_id: self.engine.execution_id().to_string(),
                    error: error.to_string(),
                };
                if let Err(e) = self.event_sink.send(event) {
                    log::debug!("Dropped evaluation event: {}", e);
                }
                FlowResult::aborted(error)
            }
        }
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Evaluate `graph` once with the built-in executor
pub fn execute_flow(
    graph: &PlotGraph,
    cache: Option<&mut GeometryCache>,
    config: &EngineConfig,
) -> FlowResult {
    Flow::new(config.clone()).run(graph, cache)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
