//! Motif validators.
//!
//! Each validator inspects the decomposed graph around one candidate node and reports whether a
//! specific motif begins there. Validators never mutate the graph; the engine in
//! [`crate::decompose`] decides what to do with a [`Motif`].
//!
//! # Module Organization
//!
//! - [`bulge`]: parallel edges between an ordered pair
//! - [`chain`]: maximal simple paths, with trivial-fake-edge trimming
//! - [`cyclic_chain`]: simple cycles reported rotated to the candidate
//! - [`bubble`]: 3-node, simple and minimal superbubbles
//! - [`frayed_rope`]: many starts → one middle → many ends
//! - [`bipartite`]: complete bipartite layers

mod bipartite;
mod bubble;
mod bulge;
mod chain;
mod cyclic_chain;
mod frayed_rope;

pub use bipartite::{bipartite, bipartite_top_level_only};
pub use bubble::{bubble, simple_bubble, superbubble, three_node_bubble};
pub use bulge::bulge;
pub use chain::{chain, chain_trimmed};
pub use cyclic_chain::cyclic_chain;
pub use frayed_rope::{frayed_rope, frayed_rope_top_level_only};

use serde::Serialize;

use crate::{
    error::DecompositionError,
    graph::{Adjacency, AssemblyGraph},
    properties::{EdgeId, MotifKind, NodeId},
};

/// What a validator sees of a graph.
///
/// [`Adjacency`] implements this on its own, which is how validators are unit tested; the
/// decomposed view of an [`AssemblyGraph`] adds knowledge of fake edges and Patterns.
pub trait Topology {
    fn adjacency(&self) -> &Adjacency;

    fn is_fake(&self, _edge: EdgeId) -> bool {
        false
    }

    fn is_pattern(&self, _node: NodeId) -> bool {
        false
    }
}

impl Topology for Adjacency {
    fn adjacency(&self) -> &Adjacency {
        self
    }
}

/// The decomposed view of an [`AssemblyGraph`].
pub struct DecomposedView<'a>(pub &'a AssemblyGraph);

impl Topology for DecomposedView<'_> {
    fn adjacency(&self) -> &Adjacency {
        self.0.decomposed_adjacency()
    }

    fn is_fake(&self, edge: EdgeId) -> bool {
        self.0.edge(edge).is_some_and(|e| e.fake)
    }

    fn is_pattern(&self, node: NodeId) -> bool {
        self.0.is_pattern(node)
    }
}

/// A successful validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Motif {
    pub kind: MotifKind,
    /// Members in motif order: path order for chains, start first and end last otherwise.
    pub nodes: Vec<NodeId>,
    pub starts: Vec<NodeId>,
    pub ends: Vec<NodeId>,
}

impl Motif {
    pub(crate) fn with_boundary(
        kind: MotifKind,
        nodes: Vec<NodeId>,
        start: NodeId,
        end: NodeId,
    ) -> Self {
        Motif {
            kind,
            nodes,
            starts: vec![start],
            ends: vec![end],
        }
    }

    pub fn start(&self) -> Option<NodeId> {
        match self.starts.as_slice() {
            [only] if self.kind.has_single_boundary() => Some(*only),
            _ => None,
        }
    }

    pub fn end(&self) -> Option<NodeId> {
        match self.ends.as_slice() {
            [only] if self.kind.has_single_boundary() => Some(*only),
            _ => None,
        }
    }
}

pub type Validation = Result<Option<Motif>, DecompositionError>;

pub(crate) fn verify_node_in_graph<T: Topology + ?Sized>(
    g: &T,
    node: NodeId,
) -> Result<(), DecompositionError> {
    if g.adjacency().contains(node) {
        Ok(())
    } else {
        Err(DecompositionError::invariant(format!(
            "candidate {node} is not a vertex of the decomposed graph"
        )))
    }
}

/// Drop a motif that would swallow an already registered Pattern.
pub(crate) fn reject_patterns<T: Topology + ?Sized>(g: &T, found: Option<Motif>) -> Option<Motif> {
    found.filter(|m| !m.nodes.iter().any(|n| g.is_pattern(*n)))
}

/// True when the single edge `src → tgt` is fake and joins a plain node to a Pattern.
///
/// Such an edge is left behind when a boundary node is split; a chain ending in it would just
/// re-collapse the split half into a chain of one real member.
pub(crate) fn is_trivial_fake_edge<T: Topology + ?Sized>(
    g: &T,
    src: NodeId,
    tgt: NodeId,
) -> Result<bool, DecompositionError> {
    let Some(edge) = g.adjacency().edges_between(src, tgt).next() else {
        return Ok(false);
    };
    if !g.is_fake(edge) {
        return Ok(false);
    }
    match (g.is_pattern(src), g.is_pattern(tgt)) {
        (false, false) => Err(DecompositionError::invariant(format!(
            "fake edge {edge} joins two plain nodes ({src} → {tgt}) in the decomposed graph"
        ))),
        (true, true) => Ok(false),
        _ => Ok(true),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::BTreeSet;

    /// An adjacency plus a registry of fake edges and Patterns, for validator tests that need
    /// more than bare topology.
    pub struct Marked {
        pub adjacency: Adjacency,
        pub fake: BTreeSet<EdgeId>,
        pub patterns: BTreeSet<NodeId>,
    }

    impl Topology for Marked {
        fn adjacency(&self) -> &Adjacency {
            &self.adjacency
        }

        fn is_fake(&self, edge: EdgeId) -> bool {
            self.fake.contains(&edge)
        }

        fn is_pattern(&self, node: NodeId) -> bool {
            self.patterns.contains(&node)
        }
    }

    pub fn g(edges: &[(u64, u64)]) -> Adjacency {
        Adjacency::from_edges(edges.iter().copied())
    }

    pub fn ids(ids: &[u64]) -> Vec<NodeId> {
        ids.iter().map(|i| NodeId(*i)).collect()
    }

    pub fn id_set(ids: &[u64]) -> BTreeSet<NodeId> {
        ids.iter().map(|i| NodeId(*i)).collect()
    }

    pub fn members(m: &Motif) -> BTreeSet<NodeId> {
        m.nodes.iter().copied().collect()
    }
}
