//! Persistent geometry cache
//!
//! Entries are keyed by node id and validated by combined hash. An entry is
//! only ever returned when its stored hash equals the caller's current
//! hash, so correctness never depends on explicit invalidation; removal
//! exists to keep deleted nodes from accumulating.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::geometry::ColoredPath;
use crate::hashing::Hash;
use crate::types::{NodeId, PlotGraph};

/// Output stored for one node
#[derive(Debug, Clone, PartialEq)]
pub struct CachedOutput {
    /// Combined hash of the node when this output was computed
    pub hash: Hash,
    /// The node's geometry
    pub paths: Arc<Vec<ColoredPath>>,
    /// Node-local error recorded alongside the (empty) output
    pub error: Option<String>,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of stored entries
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, `0.0` when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Cross-run node output cache
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<NodeId, CachedOutput>,
    hits: u64,
    misses: u64,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node's output, counting the hit or miss
    pub fn get(&mut self, node_id: &str, hash: Hash) -> Option<&CachedOutput> {
        match self.entries.get(node_id) {
            Some(entry) if entry.hash == hash => {
                self.hits += 1;
                log::trace!("Cache hit for node '{}'", node_id);
                Some(entry)
            }
            _ => {
                self.misses += 1;
                log::trace!("Cache miss for node '{}'", node_id);
                None
            }
        }
    }

    /// Inspect an entry without touching the counters
    pub fn peek(&self, node_id: &str) -> Option<&CachedOutput> {
        self.entries.get(node_id)
    }

    /// Store a node's output, replacing any previous entry
    pub fn set(
        &mut self,
        node_id: impl Into<NodeId>,
        hash: Hash,
        paths: Arc<Vec<ColoredPath>>,
        error: Option<String>,
    ) {
        self.entries
            .insert(node_id.into(), CachedOutput { hash, paths, error });
    }

    /// Remove entries for the given nodes, returning how many existed
    pub fn invalidate_nodes<I, S>(&mut self, node_ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        node_ids
            .into_iter()
            .filter(|id| self.entries.remove(id.as_ref()).is_some())
            .count()
    }

    /// Drop entries for nodes that no longer exist in `graph`
    pub fn retain_nodes(&mut self, graph: &PlotGraph) -> usize {
        let before = self.entries.len();
        let live: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        self.entries.retain(|id, _| live.contains(id.as_str()));
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!("Pruned {} stale cache entries", removed);
        }
        removed
    }

    /// Remove every entry (counters are kept)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }
}
