//! Multigraph adjacency index.
//!
//! One [`Adjacency`] backs each view of an [`crate::graph::AssemblyGraph`]. The edge records are
//! the source of truth; an index only mirrors one endpoint pair of each edge and is patched
//! whenever that pair changes.
//!
//! The index is a petgraph [`StableDiGraph`] weighted by ids, so node and edge indices survive
//! removals, plus id → index maps. Neighbour queries come back as [`Neighbors`] maps keyed by
//! id, which keeps every traversal over them in ascending id order regardless of insertion
//! history.

use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableDiGraph},
    visit::EdgeRef,
    Direction,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::properties::{EdgeId, NodeId};

/// Neighbour → the parallel edges connecting to it.
pub type Neighbors = BTreeMap<NodeId, BTreeSet<EdgeId>>;

#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    graph: StableDiGraph<NodeId, EdgeId>,
    id_to_index: BTreeMap<NodeId, NodeIndex>,
    edge_to_index: BTreeMap<EdgeId, EdgeIndex>,
}

impl PartialEq for Adjacency {
    fn eq(&self, other: &Self) -> bool {
        self.id_to_index.keys().eq(other.id_to_index.keys()) && self.edges().eq(other.edges())
    }
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(src, tgt)` pairs, numbering edges in iteration order.
    pub fn from_edges<I, N>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
        N: Into<NodeId>,
    {
        let mut adj = Adjacency::new();
        for (i, (src, tgt)) in edges.into_iter().enumerate() {
            adj.add_edge(EdgeId(i as u64), src.into(), tgt.into());
        }
        adj
    }

    pub fn as_graph(&self) -> &StableDiGraph<NodeId, EdgeId> {
        &self.graph
    }

    pub fn node_index(&self, node: NodeId) -> Option<NodeIndex> {
        self.id_to_index.get(&node).copied()
    }

    pub fn add_node(&mut self, node: NodeId) -> NodeIndex {
        if let Some(index) = self.node_index(node) {
            return index;
        }
        let index = self.graph.add_node(node);
        self.id_to_index.insert(node, index);
        index
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.id_to_index.contains_key(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.id_to_index.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.id_to_index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every indexed edge as `(edge, src, tgt)`, ordered by source, then target, then edge.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId)> + '_ {
        self.id_to_index.iter().flat_map(move |(src, index)| {
            self.neighbors(*index, Direction::Outgoing)
                .into_iter()
                .flat_map(move |(tgt, edges)| edges.into_iter().map(move |e| (e, *src, tgt)))
        })
    }

    /// Insert an edge, adding either endpoint if absent. An edge id is indexed once; adding it
    /// again moves it to the new endpoints.
    pub fn add_edge(&mut self, edge: EdgeId, src: NodeId, tgt: NodeId) {
        if let Some(stale) = self.edge_to_index.remove(&edge) {
            self.graph.remove_edge(stale);
        }
        let src_idx = self.add_node(src);
        let tgt_idx = self.add_node(tgt);
        let index = self.graph.add_edge(src_idx, tgt_idx, edge);
        self.edge_to_index.insert(edge, index);
    }

    /// Remove an edge; returns false if it was not indexed under `(src, tgt)`.
    pub fn remove_edge(&mut self, edge: EdgeId, src: NodeId, tgt: NodeId) -> bool {
        let Some(index) = self.edge_to_index.get(&edge).copied() else {
            return false;
        };
        let expected = (self.node_index(src), self.node_index(tgt));
        match self.graph.edge_endpoints(index) {
            Some((s, t)) if (Some(s), Some(t)) == expected => {
                self.graph.remove_edge(index);
                self.edge_to_index.remove(&edge);
                true
            }
            _ => false,
        }
    }

    /// Remove a node and every edge touching it. Returns the removed edges as
    /// `(edge, src, tgt)` in edge order; a self-loop is reported once.
    pub fn remove_node(&mut self, node: NodeId) -> Vec<(EdgeId, NodeId, NodeId)> {
        let Some(index) = self.id_to_index.remove(&node) else {
            return Vec::new();
        };
        let mut removed: BTreeMap<EdgeId, (NodeId, NodeId)> = BTreeMap::new();
        for direction in [Direction::Outgoing, Direction::Incoming] {
            for edge in self.graph.edges_directed(index, direction) {
                removed.insert(
                    *edge.weight(),
                    (self.graph[edge.source()], self.graph[edge.target()]),
                );
            }
        }
        for edge in removed.keys() {
            self.edge_to_index.remove(edge);
        }
        self.graph.remove_node(index);
        removed
            .into_iter()
            .map(|(edge, (src, tgt))| (edge, src, tgt))
            .collect()
    }

    /// Re-key `old` as `new`, keeping every incident edge. If `new` is already indexed the two
    /// vertices are merged.
    pub fn rename_node(&mut self, old: NodeId, new: NodeId) {
        if old == new || !self.contains(old) {
            return;
        }
        if !self.contains(new) {
            if let Some(index) = self.id_to_index.remove(&old) {
                self.graph[index] = new;
                self.id_to_index.insert(new, index);
            }
            return;
        }
        for (e, src, tgt) in self.remove_node(old) {
            let src = if src == old { new } else { src };
            let tgt = if tgt == old { new } else { tgt };
            self.add_edge(e, src, tgt);
        }
    }

    pub fn successors(&self, node: NodeId) -> Neighbors {
        match self.node_index(node) {
            Some(index) => self.neighbors(index, Direction::Outgoing),
            None => Neighbors::new(),
        }
    }

    pub fn predecessors(&self, node: NodeId) -> Neighbors {
        match self.node_index(node) {
            Some(index) => self.neighbors(index, Direction::Incoming),
            None => Neighbors::new(),
        }
    }

    fn neighbors(&self, index: NodeIndex, direction: Direction) -> Neighbors {
        let mut nbrs = Neighbors::new();
        for edge in self.graph.edges_directed(index, direction) {
            let other = match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            };
            nbrs.entry(self.graph[other])
                .or_default()
                .insert(*edge.weight());
        }
        nbrs
    }

    /// Parallel edges `src → tgt`, ascending.
    pub fn edges_between(&self, src: NodeId, tgt: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let found: BTreeSet<EdgeId> = match (self.node_index(src), self.node_index(tgt)) {
            (Some(s), Some(t)) => self
                .graph
                .edges_directed(s, Direction::Outgoing)
                .filter(|edge| edge.target() == t)
                .map(|edge| *edge.weight())
                .collect(),
            _ => BTreeSet::new(),
        };
        found.into_iter()
    }

    /// Every edge incident on `node`, self-loops once.
    pub fn incident_edges(&self, node: NodeId) -> BTreeSet<EdgeId> {
        let Some(index) = self.node_index(node) else {
            return BTreeSet::new();
        };
        [Direction::Outgoing, Direction::Incoming]
            .into_iter()
            .flat_map(|direction| self.graph.edges_directed(index, direction))
            .map(|edge| *edge.weight())
            .collect()
    }

    /// Every vertex joined to `node` by a path of edges in either direction, `node` included.
    pub fn component_of(&self, node: NodeId) -> BTreeSet<NodeId> {
        let mut component = BTreeSet::new();
        let mut stack: Vec<NodeIndex> = self.node_index(node).into_iter().collect();
        while let Some(index) = stack.pop() {
            if component.insert(self.graph[index]) {
                stack.extend(self.graph.neighbors_undirected(index));
            }
        }
        component
    }

    /// Sum of parallel edge multiplicities leaving `node`.
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.degree(node, Direction::Outgoing)
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.degree(node, Direction::Incoming)
    }

    fn degree(&self, node: NodeId, direction: Direction) -> usize {
        self.node_index(node)
            .map(|index| self.graph.edges_directed(index, direction).count())
            .unwrap_or(0)
    }
}

/// True unless `nbrs` is exactly one neighbour reached by exactly one edge.
pub(crate) fn not_single_edge(nbrs: &Neighbors) -> bool {
    match nbrs.iter().next() {
        Some((_, edges)) => nbrs.len() != 1 || edges.len() != 1,
        None => true,
    }
}

/// The neighbour of `nbrs` when there is exactly one distinct neighbour.
pub(crate) fn sole_neighbor(nbrs: &Neighbors) -> Option<NodeId> {
    match nbrs.len() {
        1 => nbrs.keys().next().copied(),
        _ => None,
    }
}
