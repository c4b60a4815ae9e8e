//! Penflow Engine - node graphs to plotter strokes
//!
//! This crate evaluates a node graph (as saved by the editor) into a flat
//! list of colored polylines ready for a pen plotter. It provides:
//!
//! - Typed, lenient parameter parsing for every node kind
//! - Content hashing of each node and its transitive inputs
//! - Demand-driven evaluation with a per-run memo and a persistent cache
//! - Raster preloading for image-sampling nodes
//! - Graph validation, a node registry and snapshot-based undo
//!
//! # Architecture
//!
//! - `DemandEngine`: pulls from the output node, reusing cached subgraphs
//! - `NodeExecutor`: the algorithm library behind every non-structural kind
//! - `GeometryCache`: cross-run outputs keyed by combined hash
//! - `EventSink`: progress events for editors
//!
//! # Example
//!
//! ```ignore
//! use penflow_engine::{DemandEngine, GeometryCache, GraphBuilder, NodeKind};
//!
//! let graph = GraphBuilder::new("g", "Circle")
//!     .add_node("c", NodeKind::Circle)
//!     .add_node("out", NodeKind::Output)
//!     .connect("c", "out")
//!     .build();
//!
//! let mut cache = GeometryCache::new();
//! let result = engine.evaluate(&graph, Some(&mut cache));
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod groups;
pub mod hashing;
pub mod params;
pub mod raster;
pub mod registry;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use builder::GraphBuilder;
pub use cache::{CacheStats, CachedOutput, GeometryCache};
pub use config::{EngineConfig, EngineLimits, ScriptLimits};
pub use descriptor::{DescriptorFn, NodeDescriptor, NodeMetadata, PortDataType, PortMetadata};
pub use engine::{
    DemandEngine, EvaluationResult, EvaluationStats, NodeExecutor, NodeOutput, NodeRequest,
};
pub use error::{PenflowError, Result};
pub use events::{EvaluationEvent, EventError, EventSink, NullEventSink, VecEventSink};
pub use geometry::{Affine, Bounds, ColoredPath, Point};
pub use hashing::{Hash, HashIndex};
pub use params::NodeParams;
pub use raster::{Raster, RasterStore};
pub use registry::NodeRegistry;
pub use types::{
    CanvasPosition, EdgeId, GraphEdge, GraphNode, HandleId, NodeCategory, NodeId, NodeKind,
    PlotGraph,
};
pub use undo::UndoStack;
pub use validation::{validate_graph, ValidationError};
