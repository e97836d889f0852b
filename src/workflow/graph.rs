/// Graph indexer for workflow traversal
///
/// Builds the parent → children adjacency and the root list from the editor's
/// node and edge arrays, validating the structure with a petgraph DiGraph.

use crate::error::EngineError;
use crate::workflow::types::{EdgeDefinition, NodeDefinition};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Adjacency index over a workflow graph
///
/// Child lists keep edge insertion order and roots keep node array order, so
/// traversal over the index is deterministic for a given input.
#[derive(Debug, Default)]
pub struct GraphIndex {
    /// Mapping from node ID to its children, in edge insertion order
    children_of: HashMap<String, Vec<String>>,
    /// Node IDs with no incoming edge, in node array order
    roots: Vec<String>,
    /// Mapping from node ID to its position in the node array
    positions: HashMap<String, usize>,
}

impl GraphIndex {
    /// Build the index, rejecting duplicate ids, dangling edges and cycles
    pub fn build(nodes: &[NodeDefinition], edges: &[EdgeDefinition]) -> Result<Self, EngineError> {
        tracing::debug!("🏗️ Indexing graph with {} nodes and {} edges", nodes.len(), edges.len());

        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut node_id_to_index: HashMap<&str, NodeIndex> = HashMap::new();
        let mut positions = HashMap::new();

        for (position, node) in nodes.iter().enumerate() {
            if node_id_to_index.contains_key(node.id.as_str()) {
                return Err(EngineError::DuplicateNode { node_id: node.id.clone() });
            }
            let index = graph.add_node(node.id.as_str());
            node_id_to_index.insert(node.id.as_str(), index);
            positions.insert(node.id.clone(), position);
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        for edge in edges {
            let lookup = |node_id: &str| {
                node_id_to_index
                    .get(node_id)
                    .copied()
                    .ok_or_else(|| EngineError::UnknownNode {
                        edge_id: edge.id.clone(),
                        node_id: node_id.to_string(),
                    })
            };
            let from = lookup(&edge.source)?;
            let to = lookup(&edge.target)?;

            graph.add_edge(from, to, ());
            children_of
                .entry(edge.source.clone())
                .or_default()
                .push(edge.target.clone());
            tracing::debug!("  🔗 Indexed edge '{}': '{}' → '{}'", edge.id, edge.source, edge.target);
        }

        if let Err(cycle) = toposort(&graph, None) {
            let node_id = graph[cycle.node_id()].to_string();
            tracing::error!("❌ Workflow graph contains a cycle through '{}'", node_id);
            return Err(EngineError::CycleDetected { node_id });
        }

        let roots = nodes
            .iter()
            .filter(|node| {
                graph
                    .neighbors_directed(node_id_to_index[node.id.as_str()], petgraph::Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();

        tracing::debug!("🌱 Roots: {:?}", roots);

        Ok(Self {
            children_of,
            roots,
            positions,
        })
    }

    /// Root node IDs in node array order
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Children of a node in edge insertion order (empty for leaves)
    pub fn children(&self, node_id: &str) -> &[String] {
        self.children_of
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position of a node in the original node array
    pub fn position(&self, node_id: &str) -> Option<usize> {
        self.positions.get(node_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::NodeKind;

    fn node(id: &str) -> NodeDefinition {
        NodeDefinition::new(id, NodeKind::Start)
    }

    fn edge(id: &str, source: &str, target: &str) -> EdgeDefinition {
        EdgeDefinition::new(id, source, target)
    }

    #[test]
    fn test_empty_graph_has_no_roots() {
        let index = GraphIndex::build(&[], &[]).unwrap();
        assert!(index.roots().is_empty());
    }

    #[test]
    fn test_isolated_nodes_are_all_roots() {
        let nodes = vec![node("c"), node("a"), node("b")];
        let index = GraphIndex::build(&nodes, &[]).unwrap();
        assert_eq!(index.roots(), ["c", "a", "b"]);
    }

    #[test]
    fn test_children_keep_edge_order() {
        let nodes = vec![node("root"), node("x"), node("y"), node("z")];
        let edges = vec![
            edge("e1", "root", "z"),
            edge("e2", "root", "x"),
            edge("e3", "root", "y"),
        ];

        let index = GraphIndex::build(&nodes, &edges).unwrap();
        assert_eq!(index.roots(), ["root"]);
        assert_eq!(index.children("root"), ["z", "x", "y"]);
        assert!(index.children("x").is_empty());
    }

    #[test]
    fn test_diamond_has_single_root() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![
            edge("e1", "a", "b"),
            edge("e2", "a", "c"),
            edge("e3", "b", "d"),
            edge("e4", "c", "d"),
        ];

        let index = GraphIndex::build(&nodes, &edges).unwrap();
        assert_eq!(index.roots(), ["a"]);
        assert_eq!(index.position("d"), Some(3));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let nodes = vec![node("s"), node("a"), node("b")];
        let edges = vec![
            edge("e1", "s", "a"),
            edge("e2", "a", "b"),
            edge("e3", "b", "a"),
        ];

        let err = GraphIndex::build(&nodes, &edges).unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected { .. }));
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let nodes = vec![node("a")];
        let edges = vec![edge("e1", "a", "a")];

        let err = GraphIndex::build(&nodes, &edges).unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected { node_id } if node_id == "a"));
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let nodes = vec![node("a")];
        let edges = vec![edge("e1", "a", "ghost")];

        let err = GraphIndex::build(&nodes, &edges).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownNode { edge_id, node_id } if edge_id == "e1" && node_id == "ghost"
        ));
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let nodes = vec![node("a"), node("a")];
        let err = GraphIndex::build(&nodes, &[]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateNode { .. }));
    }
}
