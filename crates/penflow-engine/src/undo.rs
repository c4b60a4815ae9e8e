//! Snapshot history for plot graphs
//!
//! Each edit pushes a zstd-compressed JSON snapshot of the whole graph.
//! Restoring a snapshot brings back the exact parameter bags, so the
//! geometry cache still holds outputs for every subgraph that existed at
//! that point.

use std::collections::VecDeque;

use crate::error::{PenflowError, Result};
use crate::types::PlotGraph;

const DEFAULT_CAPACITY: usize = 100;
const COMPRESSION_LEVEL: i32 = 3;

/// Undo/redo stack of compressed graph snapshots
pub struct UndoStack {
    snapshots: VecDeque<Vec<u8>>,
    /// Index of the snapshot matching the editor's current state
    current: usize,
    capacity: usize,
}

impl UndoStack {
    /// Create a stack keeping at most `capacity` snapshots (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record `graph` as the newest state
    ///
    /// Discards any redo history. A snapshot identical to the current one
    /// is not recorded twice; returns whether a snapshot was added.
    pub fn push(&mut self, graph: &PlotGraph) -> Result<bool> {
        let compressed = compress(graph)?;
        if self.snapshots.get(self.current) == Some(&compressed) {
            return Ok(false);
        }

        self.snapshots.truncate(self.current + 1);
        self.snapshots.push_back(compressed);
        self.current = self.snapshots.len() - 1;

        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
            self.current -= 1;
        }
        Ok(true)
    }

    /// Step back one snapshot
    pub fn undo(&mut self) -> Option<Result<PlotGraph>> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        Some(self.restore(self.current))
    }

    /// Step forward one snapshot
    pub fn redo(&mut self) -> Option<Result<PlotGraph>> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        Some(self.restore(self.current))
    }

    /// The snapshot at the current position
    pub fn current(&self) -> Option<Result<PlotGraph>> {
        (!self.snapshots.is_empty()).then(|| self.restore(self.current))
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = 0;
    }

    /// Total bytes held by all snapshots
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(Vec::len).sum()
    }

    fn restore(&self, index: usize) -> Result<PlotGraph> {
        let json = zstd::decode_all(&self.snapshots[index][..])
            .map_err(|e| PenflowError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn compress(graph: &PlotGraph) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(graph)?;
    zstd::encode_all(&json[..], COMPRESSION_LEVEL).map_err(|e| PenflowError::Compression(e.to_string()))
}
