//! Graph module: the arena of nodes, edges and Patterns plus the two synchronized views.
//!
//! # Module Organization
//!
//! - [`adjacency`]: multigraph index shared by both views
//! - [`ingest`]: input contract checks and construction from a [`GraphInput`]
//! - [`views`]: petgraph exports of the full and decomposed views
//! - [`verify`]: the expansion/consistency check run after a decomposition
//!
//! The *full* view indexes every edge by its `current` endpoints. The *decomposed* view indexes
//! only top-level edges (those with no parent Pattern) by their `decomposed` endpoints, and its
//! vertex set is exactly the top level of the hierarchy.

mod adjacency;
mod ingest;
mod verify;
mod views;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub use adjacency::{Adjacency, Neighbors};
pub(crate) use adjacency::{not_single_edge, sole_neighbor};
pub use ingest::{EdgeRecord, GraphInput, NodeRecord, RESERVED_ATTRIBUTES};
pub use views::IdGraph;
pub(crate) use views::weakly_connected_components;

use crate::{
    error::DecompositionError,
    properties::{Edge, EdgeId, Node, NodeId, Pattern, Vertex},
};

/// Everything below one Pattern, flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Descendants {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<EdgeId>,
    pub patterns: BTreeSet<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyGraph {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    pub(crate) patterns: BTreeMap<NodeId, Pattern>,
    pub(crate) full: Adjacency,
    pub(crate) decomposed: Adjacency,
    next_node_id: u64,
    next_edge_id: u64,
}

impl AssemblyGraph {
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, Edge> {
        &self.edges
    }

    pub fn patterns(&self) -> &BTreeMap<NodeId, Pattern> {
        &self.patterns
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn pattern(&self, id: NodeId) -> Option<&Pattern> {
        self.patterns.get(&id)
    }

    pub fn vertex(&self, id: NodeId) -> Option<Vertex<'_>> {
        match self.nodes.get(&id) {
            Some(node) => Some(Vertex::Node(node)),
            None => self.patterns.get(&id).map(Vertex::Pattern),
        }
    }

    pub fn is_pattern(&self, id: NodeId) -> bool {
        self.patterns.contains_key(&id)
    }

    /// Index of the full view: every plain node and every edge at its current endpoints.
    pub fn full_adjacency(&self) -> &Adjacency {
        &self.full
    }

    /// Index of the decomposed view: top-level vertices and edges only.
    pub fn decomposed_adjacency(&self) -> &Adjacency {
        &self.decomposed
    }

    /// Ids of every vertex with no parent, ascending.
    pub fn top_level(&self) -> Vec<NodeId> {
        self.decomposed.nodes().collect()
    }

    pub fn split_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_split())
            .map(|n| n.id)
            .collect()
    }

    /// Immediate children of a Pattern: its member vertices and internal edges.
    pub fn children(
        &self,
        pattern: NodeId,
    ) -> Result<(&BTreeSet<NodeId>, &BTreeSet<EdgeId>), DecompositionError> {
        let p = self.pattern_ref(pattern)?;
        Ok((&p.nodes, &p.edges))
    }

    /// Recursively expand a Pattern down to plain nodes.
    pub fn descendants(&self, pattern: NodeId) -> Result<Descendants, DecompositionError> {
        let mut out = Descendants::default();
        let mut stack = vec![pattern];
        while let Some(pid) = stack.pop() {
            let p = self.pattern_ref(pid)?;
            out.edges.extend(p.edges.iter().copied());
            for child in p.nodes.iter() {
                if self.patterns.contains_key(child) {
                    out.patterns.insert(*child);
                    stack.push(*child);
                } else if self.nodes.contains_key(child) {
                    out.nodes.insert(*child);
                } else {
                    return Err(DecompositionError::invariant(format!(
                        "pattern {pid} lists child {child}, which is neither a node nor a pattern"
                    )));
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn pattern_ref(&self, id: NodeId) -> Result<&Pattern, DecompositionError> {
        self.patterns
            .get(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown pattern {id}")))
    }

    pub(crate) fn pattern_mut(&mut self, id: NodeId) -> Result<&mut Pattern, DecompositionError> {
        self.patterns
            .get_mut(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown pattern {id}")))
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node, DecompositionError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown node {id}")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DecompositionError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown node {id}")))
    }

    pub(crate) fn edge_ref(&self, id: EdgeId) -> Result<&Edge, DecompositionError> {
        self.edges
            .get(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown edge {id}")))
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, DecompositionError> {
        self.edges
            .get_mut(&id)
            .ok_or_else(|| DecompositionError::invariant(format!("unknown edge {id}")))
    }

    /// The Pattern directly containing `id`, for nodes and Patterns alike.
    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>, DecompositionError> {
        match self.vertex(id) {
            Some(v) => Ok(v.parent()),
            None => Err(DecompositionError::invariant(format!(
                "{id} is neither a known node nor a known pattern"
            ))),
        }
    }

    pub(crate) fn set_parent(
        &mut self,
        id: NodeId,
        parent: Option<NodeId>,
    ) -> Result<(), DecompositionError> {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        } else {
            self.pattern_mut(id)?.parent = parent;
        }
        Ok(())
    }

    /// The containers of `id`, innermost first, ending with `None` for the top level.
    pub(crate) fn levels(&self, id: NodeId) -> Result<Vec<Option<NodeId>>, DecompositionError> {
        let mut levels = Vec::new();
        let mut current = self.parent_of(id)?;
        while let Some(p) = current {
            levels.push(Some(p));
            current = self.parent_of(p)?;
        }
        levels.push(None);
        Ok(levels)
    }

    /// The vertex that represents `id` among the immediate children of `level` (or at the top
    /// level for `None`): `id` itself or one of its ancestors.
    pub fn ancestor_at_level(
        &self,
        id: NodeId,
        level: Option<NodeId>,
    ) -> Result<Option<NodeId>, DecompositionError> {
        let mut current = id;
        loop {
            let parent = self.parent_of(current)?;
            if parent == level {
                return Ok(Some(current));
            }
            match parent {
                Some(p) => current = p,
                None => return Ok(None),
            }
        }
    }

    pub fn is_ancestor_or_self(
        &self,
        ancestor: NodeId,
        id: NodeId,
    ) -> Result<bool, DecompositionError> {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return Ok(true);
            }
            current = self.parent_of(c)?;
        }
        Ok(false)
    }

    /// Innermost container holding both `a` and `b`; the level an edge between them lives at.
    pub(crate) fn common_level(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> Result<Option<NodeId>, DecompositionError> {
        let b_levels = self.levels(b)?;
        Ok(self
            .levels(a)?
            .into_iter()
            .find(|l| b_levels.contains(l))
            .flatten())
    }

    pub(crate) fn alloc_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    pub(crate) fn alloc_edge_id(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }

    /// Point the decomposed endpoints of `edge` at `(src, tgt)`, patching the decomposed index
    /// when the edge is a top-level edge.
    pub(crate) fn reroute_decomposed(
        &mut self,
        edge: EdgeId,
        src: NodeId,
        tgt: NodeId,
    ) -> Result<(), DecompositionError> {
        let record = self.edge_mut(edge)?;
        let old = record.decomposed;
        let top_level = record.parent.is_none();
        record.reroute_decomposed_src(src);
        record.reroute_decomposed_tgt(tgt);
        if top_level {
            self.decomposed.remove_edge(edge, old.src, old.tgt);
            self.decomposed.add_edge(edge, src, tgt);
        }
        Ok(())
    }

    /// Point the current endpoints of `edge` at `(src, tgt)`, patching the full index.
    pub(crate) fn reroute_current(
        &mut self,
        edge: EdgeId,
        src: NodeId,
        tgt: NodeId,
    ) -> Result<(), DecompositionError> {
        let record = self.edge_mut(edge)?;
        let old = record.current;
        record.current.src = src;
        record.current.tgt = tgt;
        self.full.remove_edge(edge, old.src, old.tgt);
        self.full.add_edge(edge, src, tgt);
        Ok(())
    }

    /// Recompute which level `edge` belongs to from its current endpoints, move it there and
    /// refresh its decomposed endpoints.
    pub(crate) fn relevel_edge(&mut self, edge: EdgeId) -> Result<(), DecompositionError> {
        let (current, old_parent, old_dec) = {
            let e = self.edge_ref(edge)?;
            (e.current, e.parent, e.decomposed)
        };
        let level = self.common_level(current.src, current.tgt)?;
        let resolve = |graph: &Self, id: NodeId| {
            graph.ancestor_at_level(id, level)?.ok_or_else(|| {
                DecompositionError::invariant(format!(
                    "edge {edge}: endpoint {id} has no ancestor at level {level:?}"
                ))
            })
        };
        let src = resolve(self, current.src)?;
        let tgt = resolve(self, current.tgt)?;

        match old_parent {
            None => {
                self.decomposed.remove_edge(edge, old_dec.src, old_dec.tgt);
            }
            Some(p) => {
                self.pattern_mut(p)?.edges.remove(&edge);
            }
        }
        let record = self.edge_mut(edge)?;
        record.reroute_decomposed_src(src);
        record.reroute_decomposed_tgt(tgt);
        record.parent = level;
        match level {
            None => self.decomposed.add_edge(edge, src, tgt),
            Some(p) => {
                self.pattern_mut(p)?.edges.insert(edge);
            }
        }
        Ok(())
    }
}
