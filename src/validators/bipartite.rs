use std::collections::BTreeSet;

use super::{reject_patterns, verify_node_in_graph, Motif, Topology, Validation};
use crate::properties::{MotifKind, NodeId};

/// A complete bipartite layer: every start has exactly one edge to every end and nothing else,
/// every end is reached from every start and nothing else.
///
/// The ends are the successors of `start`, the starts are everything feeding those ends. Both
/// sides need at least two members and must be disjoint. Starts may have other predecessors
/// and ends other successors, but no edges may run between two starts, between two ends, or
/// from an end back to a start.
pub fn bipartite<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();

    let ends: BTreeSet<NodeId> = adj.successors(start).keys().copied().collect();
    if ends.len() < 2 {
        return Ok(None);
    }
    let starts: BTreeSet<NodeId> = ends
        .iter()
        .flat_map(|e| adj.predecessors(*e).into_keys())
        .collect();
    if starts.len() < 2 || !starts.is_disjoint(&ends) {
        return Ok(None);
    }

    for s in starts.iter() {
        let succ = adj.successors(*s);
        if succ.keys().copied().collect::<BTreeSet<_>>() != ends
            || succ.values().any(|edges| edges.len() != 1)
        {
            return Ok(None);
        }
        if adj
            .predecessors(*s)
            .keys()
            .any(|p| ends.contains(p) || starts.contains(p))
        {
            return Ok(None);
        }
    }
    for e in ends.iter() {
        let pred = adj.predecessors(*e);
        if pred.keys().copied().collect::<BTreeSet<_>>() != starts {
            return Ok(None);
        }
        if adj
            .successors(*e)
            .keys()
            .any(|n| ends.contains(n) || starts.contains(n))
        {
            return Ok(None);
        }
    }

    let starts: Vec<NodeId> = starts.into_iter().collect();
    let ends: Vec<NodeId> = ends.into_iter().collect();
    let mut nodes = starts.clone();
    nodes.extend(ends.iter().copied());
    Ok(Some(Motif {
        kind: MotifKind::Bipartite,
        nodes,
        starts,
        ends,
    }))
}

/// [bipartite], rejecting layers that would contain an existing Pattern.
pub fn bipartite_top_level_only<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    Ok(reject_patterns(g, bipartite(g, start)?))
}
