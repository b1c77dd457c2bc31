use petgraph::Direction;
use std::collections::BTreeSet;

use crate::{
    error::DecompositionError,
    graph::AssemblyGraph,
    properties::{Edge, EdgeId, NodeId, SplitSide},
};

impl AssemblyGraph {
    /// Split a motif's start node. The node itself stays inside the motif as the right half; a
    /// new left half takes over every edge entering from outside `members`, and a fake edge
    /// joins the two. Returns the new left half.
    pub(crate) fn split_start(
        &mut self,
        start: NodeId,
        members: &BTreeSet<NodeId>,
    ) -> Result<NodeId, DecompositionError> {
        let external = self.external_edges(start, members, Direction::Incoming);
        let left_id = self.alloc_node_id();
        let left = self.node_mut(start)?.split_off(left_id, SplitSide::Left);
        self.nodes.insert(left_id, left);
        self.full.add_node(left_id);
        self.decomposed.add_node(left_id);

        for edge in external.iter() {
            let (current, decomposed) = {
                let e = self.edge_ref(*edge)?;
                (e.current, e.decomposed)
            };
            self.reroute_current(*edge, current.src, left_id)?;
            self.reroute_decomposed(*edge, decomposed.src, left_id)?;
        }
        let fake = self.add_fake_edge(left_id, start);
        tracing::debug!(
            "[split] start {start} -> {left_id}{} / {start}{}, {} external edges moved, fake edge {fake}",
            SplitSide::Left.suffix(),
            SplitSide::Right.suffix(),
            external.len(),
        );
        Ok(left_id)
    }

    /// Split a motif's end node. The node stays inside the motif as the left half; a new right
    /// half takes over every edge leaving to outside `members`. Returns the new right half.
    pub(crate) fn split_end(
        &mut self,
        end: NodeId,
        members: &BTreeSet<NodeId>,
    ) -> Result<NodeId, DecompositionError> {
        let external = self.external_edges(end, members, Direction::Outgoing);
        let right_id = self.alloc_node_id();
        let right = self.node_mut(end)?.split_off(right_id, SplitSide::Right);
        self.nodes.insert(right_id, right);
        self.full.add_node(right_id);
        self.decomposed.add_node(right_id);

        for edge in external.iter() {
            let (current, decomposed) = {
                let e = self.edge_ref(*edge)?;
                (e.current, e.decomposed)
            };
            self.reroute_current(*edge, right_id, current.tgt)?;
            self.reroute_decomposed(*edge, right_id, decomposed.tgt)?;
        }
        let fake = self.add_fake_edge(end, right_id);
        tracing::debug!(
            "[split] end {end} -> {end}{} / {right_id}{}, {} external edges moved, fake edge {fake}",
            SplitSide::Left.suffix(),
            SplitSide::Right.suffix(),
            external.len(),
        );
        Ok(right_id)
    }

    /// Top-level edges between `node` and vertices outside `members`.
    fn external_edges(
        &self,
        node: NodeId,
        members: &BTreeSet<NodeId>,
        direction: Direction,
    ) -> Vec<EdgeId> {
        let nbrs = match direction {
            Direction::Incoming => self.decomposed.predecessors(node),
            Direction::Outgoing => self.decomposed.successors(node),
        };
        nbrs.into_iter()
            .filter(|(other, _)| !members.contains(other))
            .flat_map(|(_, edges)| edges)
            .collect()
    }

    fn add_fake_edge(&mut self, left: NodeId, right: NodeId) -> EdgeId {
        let id = self.alloc_edge_id();
        self.edges.insert(id, Edge::new_fake(id, left, right));
        self.full.add_edge(id, left, right);
        self.decomposed.add_edge(id, left, right);
        id
    }

    /// True when a member of a motif about to be collapsed should be split on the given side:
    /// it is an unsplit plain node with top-level neighbours outside the motif.
    pub(crate) fn needs_split(
        &self,
        node: NodeId,
        members: &BTreeSet<NodeId>,
        side: SplitSide,
    ) -> bool {
        let Some(record) = self.nodes.get(&node) else {
            return false;
        };
        if record.is_split() {
            return false;
        }
        let direction = match side {
            SplitSide::Left => Direction::Incoming,
            SplitSide::Right => Direction::Outgoing,
        };
        !self.external_edges(node, members, direction).is_empty()
    }
}
