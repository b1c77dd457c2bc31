//! petgraph exports of the two views.
//!
//! - [`IdGraph`]: an owned petgraph graph whose node weights are [`NodeId`]s and whose edge
//!   weights are [`EdgeId`]s, so consumers can look records up in the arena maps.

use petgraph::{
    graph::NodeIndex,
    graphmap::UnGraphMap,
    visit::{depth_first_search, Control, DfsEvent},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Adjacency, AssemblyGraph};
use crate::properties::{EdgeId, NodeId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGraph(pub petgraph::Graph<NodeId, EdgeId>);

impl Default for IdGraph {
    fn default() -> Self {
        IdGraph(petgraph::Graph::new())
    }
}

impl IdGraph {
    pub fn as_graph(&self) -> &petgraph::Graph<NodeId, EdgeId> {
        &self.0
    }

    /// Every vertex of `adjacency` (isolated ones included) and every indexed edge.
    pub fn from_adjacency(adjacency: &Adjacency) -> Self {
        let mut graph = petgraph::Graph::new();
        let mut id_to_index = BTreeMap::new();
        for id in adjacency.nodes() {
            id_to_index.insert(id, graph.add_node(id));
        }
        for (edge, src, tgt) in adjacency.edges() {
            graph.add_edge(id_to_index[&src], id_to_index[&tgt], edge);
        }
        IdGraph(graph)
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.0.node_indices().find(|idx| self.0[*idx] == id)
    }

    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.0.node_weights().copied().collect()
    }

    pub fn edge_ids(&self) -> BTreeSet<EdgeId> {
        self.0.edge_weights().copied().collect()
    }
}

impl AssemblyGraph {
    /// Every plain node (split halves included) and every edge, real and fake.
    pub fn full_graph(&self) -> IdGraph {
        IdGraph::from_adjacency(&self.full)
    }

    /// Top-level nodes and Patterns with the edges between them.
    pub fn decomposed_graph(&self) -> IdGraph {
        IdGraph::from_adjacency(&self.decomposed)
    }
}

/// Vertex sets of the weakly connected components of `adjacency`, ordered by smallest member.
pub(crate) fn weakly_connected_components(adjacency: &Adjacency) -> Vec<BTreeSet<NodeId>> {
    let mut undirected = UnGraphMap::<NodeId, ()>::new();
    for id in adjacency.nodes() {
        undirected.add_node(id);
    }
    for (_, src, tgt) in adjacency.edges() {
        undirected.add_edge(src, tgt, ());
    }

    let mut seen = BTreeSet::new();
    let mut components = Vec::new();
    for id in adjacency.nodes() {
        if seen.contains(&id) {
            continue;
        }
        let mut component = BTreeSet::new();
        depth_first_search(&undirected, Some(id), |event| {
            if let DfsEvent::Discover(node, _) = event {
                component.insert(node);
            }
            Control::<()>::Continue
        });
        seen.extend(component.iter().copied());
        components.push(component);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_components_ignore_direction_and_keep_isolated_nodes() {
        let mut adj = Adjacency::from_edges([(0u64, 1u64), (2, 1), (5, 5), (7, 6)]);
        adj.add_node(NodeId(9));
        let components = weakly_connected_components(&adj);
        let as_ids: Vec<Vec<u64>> = components
            .iter()
            .map(|c| c.iter().map(|n| n.0).collect())
            .collect();
        assert_eq!(as_ids, vec![vec![0, 1, 2], vec![5], vec![6, 7], vec![9]]);
    }

    #[test]
    fn test_id_graph_keeps_parallel_edges() {
        let adj = Adjacency::from_edges([(0u64, 1u64), (0, 1), (1, 2)]);
        let graph = IdGraph::from_adjacency(&adj);
        assert_eq!(graph.as_graph().node_count(), 3);
        assert_eq!(graph.as_graph().edge_count(), 3);
        assert_eq!(graph.edge_ids().len(), 3);
        assert!(graph.node_index(NodeId(2)).is_some());
        assert!(graph.node_index(NodeId(3)).is_none());
    }

    #[test]
    fn test_views_export_both_levels_of_a_decomposition() {
        let (g, _) = crate::decompose::decompose(
            crate::graph::GraphInput::from_edge_list(&[(0, 1), (1, 2)]),
            &crate::config::DecomposeConfig::default(),
        )
        .unwrap();
        let full = g.full_graph();
        assert_eq!(full.node_ids(), [0, 1, 2].into_iter().map(NodeId).collect());
        assert_eq!(full.edge_ids(), [0, 1].into_iter().map(EdgeId).collect());

        let decomposed = g.decomposed_graph();
        assert_eq!(decomposed.node_ids(), g.top_level().into_iter().collect());
        assert_eq!(decomposed.node_ids(), [NodeId(3)].into_iter().collect());
        assert_eq!(decomposed.as_graph().edge_count(), 0);
    }
}
