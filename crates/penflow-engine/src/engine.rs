//! Demand-driven evaluation engine
//!
//! Evaluation pulls from the output node backwards. Each node is resolved
//! through two memo tiers:
//!
//! - **Session memo**: outputs computed during this call, so shared
//!   upstream subgraphs run at most once per evaluation
//! - **Persistent cache**: a [`GeometryCache`] owned by the caller, keyed by
//!   combined content hash, so unchanged subgraphs are skipped across calls
//!
//! A persistent-cache hit short-circuits the node's whole upstream subgraph.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::cache::GeometryCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::events::{EvaluationEvent, EventSink, NullEventSink};
use crate::geometry::ColoredPath;
use crate::groups::terminal_children;
use crate::hashing::{image_fingerprint, HashIndex};
use crate::params::NodeParams;
use crate::raster::{Raster, RasterStore};
use crate::types::{GraphNode, NodeId, NodeKind, PlotGraph};

/// What a node algorithm produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutput {
    pub paths: Vec<ColoredPath>,
    /// Node-local failure; `paths` is empty when set
    pub error: Option<String>,
}

impl NodeOutput {
    pub fn paths(paths: Vec<ColoredPath>) -> Self {
        Self { paths, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            paths: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Everything a node algorithm may look at
pub struct NodeRequest<'a> {
    pub node: &'a GraphNode,
    pub params: &'a NodeParams,
    /// Upstream geometry, concatenated in sorted incoming-edge order
    pub inputs: &'a [ColoredPath],
    /// Raster of the first connected image node that decoded
    pub raster: Option<&'a Raster>,
    pub config: &'a EngineConfig,
}

/// Computes geometry for the non-structural node kinds
///
/// `output`, `group` and `image` are handled by the engine itself and never
/// reach the executor.
pub trait NodeExecutor: Send + Sync {
    /// Run one node. An `Err` is reported as a node-local failure.
    fn execute(&self, request: &NodeRequest<'_>) -> Result<NodeOutput>;
}

/// Counters for one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationStats {
    /// Nodes whose algorithm actually ran
    pub computed: usize,
    /// Lookups answered by the session memo
    pub memo_hits: usize,
    /// Nodes adopted from the persistent cache
    pub cache_hits: usize,
    /// Persistent cache lookups that missed
    pub cache_misses: usize,
}

/// Result of one evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationResult {
    pub paths: Vec<ColoredPath>,
    /// Errors attached to individual nodes, by node id
    pub node_errors: BTreeMap<NodeId, String>,
    pub stats: EvaluationStats,
}

/// Demand-driven evaluation engine
///
/// Holds what outlives a single run: the executor, configuration, decoded
/// rasters and the event sink. The geometry cache is passed per call so
/// the caller decides its lifetime.
pub struct DemandEngine {
    executor: Arc<dyn NodeExecutor>,
    config: EngineConfig,
    rasters: RasterStore,
    event_sink: Arc<dyn EventSink>,
    execution_id: String,
}

impl DemandEngine {
    /// Create an engine with default configuration and no event sink
    pub fn new(executor: Arc<dyn NodeExecutor>) -> Self {
        Self {
            executor,
            config: EngineConfig::default(),
            rasters: RasterStore::new(),
            event_sink: Arc::new(NullEventSink),
            execution_id: String::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Id of the most recent evaluation (empty before the first)
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn rasters(&self) -> &RasterStore {
        &self.rasters
    }

    /// Evaluate the graph's output node
    ///
    /// A graph without an output node evaluates to nothing.
    pub fn evaluate(
        &mut self,
        graph: &PlotGraph,
        cache: Option<&mut GeometryCache>,
    ) -> EvaluationResult {
        let Some(sink) = graph.output_node() else {
            log::debug!("Graph '{}' has no output node", graph.id);
            return EvaluationResult::default();
        };
        let sink_id = sink.id.clone();
        self.run(graph, &sink_id, cache)
    }

    /// Evaluate a single node, e.g. for an inline preview
    pub fn evaluate_node(
        &mut self,
        graph: &PlotGraph,
        node_id: &str,
        cache: Option<&mut GeometryCache>,
    ) -> EvaluationResult {
        self.run(graph, node_id, cache)
    }

    fn run(
        &mut self,
        graph: &PlotGraph,
        target: &str,
        cache: Option<&mut GeometryCache>,
    ) -> EvaluationResult {
        let started = Instant::now();
        self.execution_id = Uuid::new_v4().to_string();
        self.emit(EvaluationEvent::EvaluationStarted {
            graph_id: graph.id.clone(),
            execution_id: self.execution_id.clone(),
        });

        let params: HashMap<NodeId, NodeParams> = graph
            .nodes
            .iter()
            .map(|n| (n.id.clone(), NodeParams::parse(n)))
            .collect();
        let hashes = HashIndex::build(graph, &params);
        let mut node_errors = BTreeMap::new();
        self.preload_rasters(graph, &params, &mut node_errors);

        let mut run = Run {
            graph,
            nodes: graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect(),
            params: &params,
            hashes: &hashes,
            executor: self.executor.as_ref(),
            config: &self.config,
            rasters: &self.rasters,
            events: self.event_sink.as_ref(),
            execution_id: &self.execution_id,
            cache,
            memo: HashMap::new(),
            stack: HashSet::new(),
            node_errors,
            stats: EvaluationStats::default(),
        };
        let paths = run.resolve(target);
        let result = EvaluationResult {
            paths: paths.as_ref().clone(),
            node_errors: run.node_errors,
            stats: run.stats,
        };

        log::info!(
            "Evaluated '{}' in {:?}: {} paths, {} computed, {} cache hits, {} cache misses",
            graph.id,
            started.elapsed(),
            result.paths.len(),
            result.stats.computed,
            result.stats.cache_hits,
            result.stats.cache_misses
        );
        self.emit(EvaluationEvent::EvaluationCompleted {
            graph_id: graph.id.clone(),
            execution_id: self.execution_id.clone(),
            path_count: result.paths.len(),
        });
        result
    }

    /// Decode every image node's raster before resolution starts
    ///
    /// Rasters no image node in `graph` refers to any more are released.
    fn preload_rasters(
        &mut self,
        graph: &PlotGraph,
        params: &HashMap<NodeId, NodeParams>,
        node_errors: &mut BTreeMap<NodeId, String>,
    ) {
        let mut live = HashSet::new();
        for node in &graph.nodes {
            let Some(NodeParams::Image(image)) = params.get(&node.id) else {
                continue;
            };
            if image.src.is_empty() {
                continue;
            }
            live.insert(image_fingerprint(&image.src));
            if let Err(e) = self.rasters.load(&image.src) {
                log::warn!("Image node '{}' could not be decoded: {}", node.id, e);
                node_errors.insert(node.id.clone(), e.to_string());
            }
        }
        self.rasters.retain(&live);
    }

    fn emit(&self, event: EvaluationEvent) {
        if let Err(e) = self.event_sink.send(event) {
            log::debug!("Dropped evaluation event: {}", e);
        }
    }
}

/// State of one evaluation call
struct Run<'a> {
    graph: &'a PlotGraph,
    nodes: HashMap<&'a str, &'a GraphNode>,
    params: &'a HashMap<NodeId, NodeParams>,
    hashes: &'a HashIndex,
    executor: &'a dyn NodeExecutor,
    config: &'a EngineConfig,
    rasters: &'a RasterStore,
    events: &'a dyn EventSink,
    execution_id: &'a str,
    cache: Option<&'a mut GeometryCache>,
    memo: HashMap<NodeId, Arc<Vec<ColoredPath>>>,
    stack: HashSet<NodeId>,
    node_errors: BTreeMap<NodeId, String>,
    stats: EvaluationStats,
}

impl<'a> Run<'a> {
    fn resolve(&mut self, node_id: &str) -> Arc<Vec<ColoredPath>> {
        if let Some(paths) = self.memo.get(node_id) {
            self.stats.memo_hits += 1;
            return Arc::clone(paths);
        }
        let Some(node) = self.nodes.get(node_id).copied() else {
            log::debug!("Skipping dangling reference to node '{}'", node_id);
            return Arc::new(Vec::new());
        };
        if !self.stack.insert(node_id.to_string()) {
            log::warn!("Cycle detected at node '{}', treating input as empty", node_id);
            return Arc::new(Vec::new());
        }

        let hash = self.hashes.get(node_id).unwrap_or_default();
        let paths = match self.lookup_cache(node_id, hash) {
            Some(paths) => paths,
            None => self.compute(node, hash),
        };

        self.stack.remove(node_id);
        self.memo.insert(node_id.to_string(), Arc::clone(&paths));
        paths
    }

    fn lookup_cache(&mut self, node_id: &str, hash: u64) -> Option<Arc<Vec<ColoredPath>>> {
        let cache = self.cache.as_deref_mut()?;
        let Some(entry) = cache.get(node_id, hash) else {
            self.stats.cache_misses += 1;
            return None;
        };
        let paths = Arc::clone(&entry.paths);
        if let Some(error) = entry.error.clone() {
            self.node_errors.insert(node_id.to_string(), error);
        }
        self.stats.cache_hits += 1;
        self.emit(EvaluationEvent::node_evaluated(
            node_id,
            self.execution_id,
            paths.len(),
            true,
        ));
        Some(paths)
    }

    fn compute(&mut self, node: &'a GraphNode, hash: u64) -> Arc<Vec<ColoredPath>> {
        let graph = self.graph;
        let incoming = graph.incoming_edges(&node.id);
        let mut inputs: Vec<ColoredPath> = Vec::new();

        let output = match node.kind() {
            None => {
                log::debug!("Unknown node kind '{}' on '{}'", node.node_type, node.id);
                NodeOutput::empty()
            }
            Some(NodeKind::Image) => NodeOutput::empty(),
            Some(NodeKind::Output) => {
                for edge in &incoming {
                    inputs.extend(self.resolve(&edge.source).iter().cloned());
                }
                NodeOutput::paths(inputs)
            }
            Some(NodeKind::Group) => {
                for child in terminal_children(graph, &node.id) {
                    inputs.extend(self.resolve(&child.id).iter().cloned());
                }
                for edge in &incoming {
                    inputs.extend(self.resolve(&edge.source).iter().cloned());
                }
                NodeOutput::paths(inputs)
            }
            Some(kind) => {
                for edge in &incoming {
                    inputs.extend(self.resolve(&edge.source).iter().cloned());
                }
                log::debug!("Computing {} node '{}'", kind, node.id);
                self.dispatch(node, &inputs)
            }
        };

        self.stats.computed += 1;
        let NodeOutput { paths, error } = output;
        let paths = Arc::new(paths);
        match &error {
            Some(message) => {
                log::warn!("Node '{}' failed: {}", node.id, message);
                self.node_errors.insert(node.id.clone(), message.clone());
                self.emit(EvaluationEvent::node_failed(&node.id, self.execution_id, message.clone()));
            }
            None => self.emit(EvaluationEvent::node_evaluated(
                &node.id,
                self.execution_id,
                paths.len(),
                false,
            )),
        }
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.set(node.id.clone(), hash, Arc::clone(&paths), error);
        }
        paths
    }

    fn dispatch(&self, node: &GraphNode, inputs: &[ColoredPath]) -> NodeOutput {
        let Some(params) = self.params.get(&node.id) else {
            return NodeOutput::empty();
        };
        let raster = self.find_raster(&node.id);
        let request = NodeRequest {
            node,
            params,
            inputs,
            raster: raster.as_deref(),
            config: self.config,
        };
        match self.executor.execute(&request) {
            Ok(output) => output,
            Err(e) => NodeOutput::failed(e.to_string()),
        }
    }

    /// First incoming image node whose raster decoded
    fn find_raster(&self, node_id: &str) -> Option<Arc<Raster>> {
        self.graph.incoming_edges(node_id).into_iter().find_map(|edge| {
            match self.params.get(&edge.source)? {
                NodeParams::Image(image) if !image.src.is_empty() => self.rasters.get(&image.src),
                _ => None,
            }
        })
    }

    fn emit(&self, event: EvaluationEvent) {
        if let Err(e) = self.events.send(event) {
            log::debug!("Dropped evaluation event: {}", e);
        }
    }
}
