//! Content hashing for cache keys
//!
//! A node's combined hash folds its validated parameters together with the
//! sorted combined hashes of everything upstream of it. Two evaluations see
//! the same combined hash exactly when the node and its transitive inputs
//! are semantically unchanged.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};

use crate::constants;
use crate::params::NodeParams;
use crate::types::{GraphNode, NodeId, NodeKind, PlotGraph};

/// A 64-bit content hash
pub type Hash = u64;

const CYCLE_MARKER: &str = "cycle";
const MISSING_MARKER: &str = "missing";

/// djb2 over UTF-8 bytes, xor variant, wrapping 64-bit
pub fn djb2(input: &str) -> Hash {
    input
        .bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33) ^ u64::from(b))
}

/// Short stand-in for a bulky embedded payload: length plus a prefix
pub fn image_fingerprint(src: &str) -> String {
    let prefix: String = src.chars().take(constants::image::FINGERPRINT_PREFIX).collect();
    format!("len:{}:{}", src.len(), prefix)
}

/// Render `value` as JSON with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// The JSON view of a node's parameters that feeds its data hash
fn hash_view(node_type: &str, params: &NodeParams) -> Value {
    match params {
        NodeParams::Image(p) => json!({
            "kind": NodeKind::Image.as_str(),
            "src": image_fingerprint(&p.src),
        }),
        NodeParams::Unknown(data) => json!({
            "kind": node_type,
            "data": data,
        }),
        NodeParams::Output
        | NodeParams::Group
        | NodeParams::Line(_)
        | NodeParams::Rect(_)
        | NodeParams::Circle(_)
        | NodeParams::Ellipse(_)
        | NodeParams::Arc(_)
        | NodeParams::Polygon(_)
        | NodeParams::Attractor(_)
        | NodeParams::LSystem(_)
        | NodeParams::Text(_)
        | NodeParams::Batak(_)
        | NodeParams::Halftone(_)
        | NodeParams::Ascii(_)
        | NodeParams::Mask(_)
        | NodeParams::Path(_)
        | NodeParams::Repeat(_)
        | NodeParams::Grid(_)
        | NodeParams::Radial(_)
        | NodeParams::Translate(_)
        | NodeParams::Rotate(_)
        | NodeParams::Scale(_)
        | NodeParams::Bytebeat(_)
        | NodeParams::Code(_) => serde_json::to_value(params).unwrap_or(Value::Null),
    }
}

/// Hash of a node's own semantic content
pub fn data_hash(node: &GraphNode, params: &NodeParams) -> Hash {
    djb2(&canonical_json(&hash_view(&node.node_type, params)))
}

/// Fold a data hash with the hashes of its inputs
///
/// The upstream list is sorted first, so input enumeration order never
/// affects the result.
pub fn combine(data: Hash, upstream: &[Hash]) -> Hash {
    let mut parts: Vec<String> = upstream.iter().map(|h| format!("{:016x}", h)).collect();
    parts.sort();
    let upstream_hash = djb2(&parts.join("|"));
    djb2(&format!("{:016x}:{:016x}", data, upstream_hash))
}

/// Combined hashes for every node of a graph, computed in one pass
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    hashes: HashMap<NodeId, Hash>,
}

impl HashIndex {
    /// Hash every node of `graph`
    ///
    /// `params` holds the validated parameters of each node; nodes missing
    /// from it are parsed on the fly.
    pub fn build(graph: &PlotGraph, params: &HashMap<NodeId, NodeParams>) -> Self {
        let nodes: HashMap<&str, &GraphNode> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut builder = IndexBuilder {
            graph,
            nodes,
            params,
            hashes: HashMap::new(),
            visiting: HashSet::new(),
        };
        for node in &graph.nodes {
            builder.combined(&node.id);
        }
        HashIndex {
            hashes: builder.hashes,
        }
    }

    pub fn get(&self, node_id: &str) -> Option<Hash> {
        self.hashes.get(node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

struct IndexBuilder<'a> {
    graph: &'a PlotGraph,
    nodes: HashMap<&'a str, &'a GraphNode>,
    params: &'a HashMap<NodeId, NodeParams>,
    hashes: HashMap<NodeId, Hash>,
    visiting: HashSet<NodeId>,
}

impl IndexBuilder<'_> {
    fn combined(&mut self, node_id: &str) -> Hash {
        if let Some(hash) = self.hashes.get(node_id) {
            return *hash;
        }
        let Some(node) = self.nodes.get(node_id).copied() else {
            return djb2(&format!("{}:{}", MISSING_MARKER, node_id));
        };
        if !self.visiting.insert(node_id.to_string()) {
            log::debug!("Cycle through node '{}' while hashing", node_id);
            return djb2(CYCLE_MARKER);
        }

        let data = match self.params.get(node_id) {
            Some(params) => data_hash(node, params),
            None => data_hash(node, &NodeParams::parse(node)),
        };

        let mut upstream: Vec<Hash> = self
            .graph
            .get_dependencies(node_id)
            .iter()
            .map(|dep| self.combined(dep))
            .collect();
        if node.kind() == Some(NodeKind::Group) {
            let children: Vec<NodeId> =
                self.graph.children_of(node_id).map(|c| c.id.clone()).collect();
            for child in children {
                let child_hash = self.combined(&child);
                upstream.push(djb2(&format!("child:{:016x}", child_hash)));
            }
        }

        let hash = combine(data, &upstream);
        self.visiting.remove(node_id);
        self.hashes.insert(node_id.to_string(), hash);
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphEdge;

    fn node(id: &str, kind: &str, data: Value) -> GraphNode {
        let mut n = GraphNode::new(id, kind);
        n.data = data;
        n
    }

    fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: id.to_string(),
            source: source.to_string(),
            source_handle: "out".to_string(),
            target: target.to_string(),
            target_handle: "in".to_string(),
        }
    }

    fn index(graph: &PlotGraph) -> HashIndex {
        HashIndex::build(graph, &HashMap::new())
    }

    fn diamond() -> PlotGraph {
        let mut graph = PlotGraph::new("g", "Diamond");
        graph.nodes.push(node("a", "line", json!({"x2": 10})));
        graph.nodes.push(node("b", "translate", json!({"dx": 5})));
        graph.nodes.push(node("c", "rotate", json!({"angle": 45})));
        graph.nodes.push(node("out", "output", Value::Null));
        graph.edges.push(edge("e1", "a", "b"));
        graph.edges.push(edge("e2", "a", "c"));
        graph.edges.push(edge("e3", "b", "out"));
        graph.edges.push(edge("e4", "c", "out"));
        graph
    }

    #[test]
    fn test_djb2_known_values() {
        assert_eq!(djb2(""), 5381);
        assert_eq!(djb2("a"), (5381u64 * 33) ^ 97);
        assert_ne!(djb2("ab"), djb2("ba"));
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let a = json!({"b": 1, "a": {"y": 2, "x": [1, {"d": 0, "c": 1}]}});
        assert_eq!(
            canonical_json(&a),
            r#"{"a":{"x":[1,{"c":1,"d":0}],"y":2},"b":1}"#
        );
    }

    #[test]
    fn test_data_hash_ignores_ui_fields_and_key_order() {
        let a = node("n", "circle", json!({"radius": 20, "cx": 5}));
        let mut b = node("n", "circle", json!({"cx": 5, "radius": 20, "selected": true}));
        b.position.x = 400.0;
        b.selected = true;
        assert_eq!(
            data_hash(&a, &NodeParams::parse(&a)),
            data_hash(&b, &NodeParams::parse(&b))
        );
    }

    #[test]
    fn test_data_hash_sees_every_parameter() {
        let a = node("n", "lsystem", json!({}));
        let b = node("n", "lsystem", json!({"scaleFactor": 0.25}));
        assert_ne!(
            data_hash(&a, &NodeParams::parse(&a)),
            data_hash(&b, &NodeParams::parse(&b))
        );
    }

    #[test]
    fn test_image_payload_is_fingerprinted() {
        let long = format!("data:image/png;base64,{}", "A".repeat(10_000));
        let fp = image_fingerprint(&long);
        assert!(fp.starts_with("len:10022:data:image/png"));
        assert!(fp.len() < 100);

        let a = node("img", "image", json!({ "src": long }));
        let b = node("img", "image", json!({ "src": format!("{}B", long) }));
        assert_ne!(
            data_hash(&a, &NodeParams::parse(&a)),
            data_hash(&b, &NodeParams::parse(&b))
        );
    }

    #[test]
    fn test_combine_sorts_upstream() {
        assert_eq!(combine(7, &[1, 2, 3]), combine(7, &[3, 1, 2]));
        assert_ne!(combine(7, &[1, 2]), combine(8, &[1, 2]));
    }

    #[test]
    fn test_edge_order_independence() {
        let graph = diamond();
        let mut permuted = graph.clone();
        permuted.edges.reverse();
        assert_eq!(index(&graph).get("out"), index(&permuted).get("out"));
    }

    #[test]
    fn test_upstream_change_propagates_to_dependents_only() {
        let graph = diamond();
        let before = index(&graph);

        let mut edited = graph.clone();
        edited.find_node_mut("b").unwrap().data = json!({"dx": 6});
        let after = index(&edited);

        assert_eq!(before.get("a"), after.get("a"));
        assert_eq!(before.get("c"), after.get("c"));
        assert_ne!(before.get("b"), after.get("b"));
        assert_ne!(before.get("out"), after.get("out"));
    }

    #[test]
    fn test_group_folds_children() {
        let mut graph = PlotGraph::new("g", "Group");
        graph.nodes.push(node("grp", "group", Value::Null));
        let mut child = node("c1", "circle", json!({"radius": 5}));
        child.parent_id = Some("grp".to_string());
        graph.nodes.push(child);
        let before = index(&graph).get("grp");

        graph.find_node_mut("c1").unwrap().data = json!({"radius": 6});
        assert_ne!(before, index(&graph).get("grp"));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = PlotGraph::new("g", "Cycle");
        graph.nodes.push(node("a", "translate", Value::Null));
        graph.nodes.push(node("b", "translate", Value::Null));
        graph.edges.push(edge("e1", "a", "b"));
        graph.edges.push(edge("e2", "b", "a"));
        let idx = index(&graph);
        assert_eq!(idx.len(), 2);
    }
}
