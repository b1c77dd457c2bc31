use std::collections::BTreeSet;

use super::{reject_patterns, verify_node_in_graph, Motif, Topology, Validation};
use crate::{
    graph::sole_neighbor,
    properties::{MotifKind, NodeId},
};

/// Two or more starts (one of them `start`) converging on a single middle node, which diverges
/// to two or more ends.
///
/// Every start must lead only to the middle and every end must be reached only from it.
/// Parallel edges are fine and so are edges from an end back to a start; self-loops and any
/// other overlap between starts, middle and ends are not. A chain running through the middle is
/// expected to have been collapsed already.
///
/// The two-or-more rule holds when the rope is found. Folding split halves back afterwards can
/// hand a boundary node to a neighbouring motif, leaving the collapsed rope with a single start
/// or end (see `remove_unnecessary_splits`).
pub fn frayed_rope<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();

    let Some(middle) = sole_neighbor(&adj.successors(start)) else {
        return Ok(None);
    };
    let starts: Vec<NodeId> = adj.predecessors(middle).keys().copied().collect();
    if starts.len() < 2 {
        return Ok(None);
    }
    if starts
        .iter()
        .any(|s| sole_neighbor(&adj.successors(*s)) != Some(middle))
    {
        return Ok(None);
    }
    let ends: Vec<NodeId> = adj.successors(middle).keys().copied().collect();
    if ends.len() < 2 {
        return Ok(None);
    }
    if ends
        .iter()
        .any(|e| sole_neighbor(&adj.predecessors(*e)) != Some(middle))
    {
        return Ok(None);
    }

    let mut nodes = starts.clone();
    nodes.push(middle);
    nodes.extend(ends.iter().copied());
    let distinct: BTreeSet<NodeId> = nodes.iter().copied().collect();
    if distinct.len() != nodes.len() {
        return Ok(None);
    }
    if nodes
        .iter()
        .any(|n| adj.successors(*n).contains_key(n))
    {
        return Ok(None);
    }

    Ok(Some(Motif {
        kind: MotifKind::FrayedRope,
        nodes,
        starts,
        ends,
    }))
}

/// [frayed_rope], rejecting ropes that would contain an existing Pattern.
pub fn frayed_rope_top_level_only<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    Ok(reject_patterns(g, frayed_rope(g, start)?))
}
