//! Node groups
//!
//! A group is an ordinary node of kind `group`; membership is recorded on
//! the children through `parent_id`. Groups may nest. A group's output is
//! the output of its terminal children (members that feed no other member)
//! followed by whatever is wired into the group from outside.

use std::collections::HashSet;

use crate::types::{GraphNode, PlotGraph};

/// Direct members of `group_id` whose output is not consumed by a sibling
///
/// Returned in node-list order.
pub fn terminal_children<'a>(graph: &'a PlotGraph, group_id: &'a str) -> Vec<&'a GraphNode> {
    let members: HashSet<&str> = graph.children_of(group_id).map(|n| n.id.as_str()).collect();
    graph
        .children_of(group_id)
        .filter(|child| {
            !graph
                .outgoing_edges(&child.id)
                .any(|e| members.contains(e.target.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphEdge;

    fn child(id: &str, kind: &str, parent: &str) -> GraphNode {
        let mut n = GraphNode::new(id, kind);
        n.parent_id = Some(parent.to_string());
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

    fn grouped_graph() -> PlotGraph {
        let mut graph = PlotGraph::new("g", "Groups");
        graph.nodes.push(GraphNode::new("grp", "group"));
        graph.nodes.push(child("line", "line", "grp"));
        graph.nodes.push(child("move", "translate", "grp"));
        graph.nodes.push(child("circle", "circle", "grp"));
        graph.nodes.push(GraphNode::new("out", "output"));
        graph.edges.push(edge("e1", "line", "move"));
        graph.edges.push(edge("e2", "grp", "out"));
        graph
    }

    #[test]
    fn test_terminal_children_skip_internal_sources() {
        let graph = grouped_graph();
        let ids: Vec<&str> = terminal_children(&graph, "grp")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["move", "circle"]);
    }

    #[test]
    fn test_terminal_children_ignore_other_groups() {
        let mut graph = grouped_graph();
        graph.nodes.push(GraphNode::new("other", "group"));
        graph.nodes.push(child("stray", "rect", "other"));
        graph.edges.push(edge("e3", "circle", "stray"));
        let ids: Vec<&str> = terminal_children(&graph, "grp")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["move", "circle"]);
        assert!(terminal_children(&graph, "missing").is_empty());
    }
}
