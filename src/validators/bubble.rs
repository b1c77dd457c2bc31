use std::collections::BTreeSet;

use super::{bulge, chain_trimmed, verify_node_in_graph, Motif, Topology, Validation};
use crate::{
    graph::{not_single_edge, sole_neighbor},
    properties::{MotifKind, NodeId},
};

/// Any bubble starting at `start`: the 3-node and simple shapes are checked first, then the
/// general superbubble search.
pub fn bubble<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    if let Some(found) = three_node_bubble(g, start)? {
        return Ok(Some(found));
    }
    if let Some(found) = simple_bubble(g, start)? {
        return Ok(Some(found));
    }
    superbubble(g, start)
}

/// `start → middle → end` plus a direct `start → end` edge.
pub fn three_node_bubble<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();
    let succ = adj.successors(start);
    if succ.len() != 2 || succ.contains_key(&start) {
        return Ok(None);
    }
    let pair: Vec<NodeId> = succ.keys().copied().collect();
    for (middle, end) in [(pair[0], pair[1]), (pair[1], pair[0])] {
        if not_single_edge(&adj.predecessors(middle))
            || not_single_edge(&adj.successors(middle))
            || sole_neighbor(&adj.successors(middle)) != Some(end)
        {
            continue;
        }
        let into_end = adj.predecessors(end);
        let expected: BTreeSet<NodeId> = [start, middle].into_iter().collect();
        if into_end.keys().copied().collect::<BTreeSet<_>>() != expected
            || into_end.values().any(|edges| edges.len() != 1)
        {
            continue;
        }
        return Ok(Some(Motif::with_boundary(
            MotifKind::Bubble,
            vec![start, middle, end],
            start,
            end,
        )));
    }
    Ok(None)
}

/// `start` fans out to two or more single-node paths that all reconverge on one end.
pub fn simple_bubble<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();
    let succ = adj.successors(start);
    if succ.len() < 2 || succ.contains_key(&start) {
        return Ok(None);
    }
    let middles: BTreeSet<NodeId> = succ.keys().copied().collect();
    let mut end = None;
    for m in middles.iter() {
        if not_single_edge(&adj.predecessors(*m)) || not_single_edge(&adj.successors(*m)) {
            return Ok(None);
        }
        let next = sole_neighbor(&adj.successors(*m));
        if end.is_some() && next != end {
            return Ok(None);
        }
        end = next;
    }
    let Some(end) = end else {
        return Ok(None);
    };
    if end == start || middles.contains(&end) {
        return Ok(None);
    }
    let into_end = adj.predecessors(end);
    if into_end.keys().copied().collect::<BTreeSet<_>>() != middles {
        return Ok(None);
    }

    let mut nodes = vec![start];
    nodes.extend(middles);
    nodes.push(end);
    Ok(Some(Motif::with_boundary(MotifKind::Bubble, nodes, start, end)))
}

/// Superbubble search from `start` by exit scanning (Onodera et al. 2013).
///
/// Nodes are labelled *seen* when reached and *visited* once all their predecessors are
/// visited; the search stops when exactly one node is seen and it is the only one ready to be
/// visited. Tips, edges back into `start` from the interior, and self-loops abort the search.
/// An edge from the end back to `start` is allowed.
///
/// On success the interior is searched again for a smaller motif (bulge, chain, then bubble)
/// and the first one found is returned instead, so the result is always minimal.
pub fn superbubble<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();
    if adj.successors(start).len() < 2 {
        return Ok(None);
    }

    let mut ready: BTreeSet<NodeId> = [start].into_iter().collect();
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut seen: BTreeSet<NodeId> = BTreeSet::new();
    let mut end = None;

    while let Some(v) = ready.pop_first() {
        visited.insert(v);
        seen.remove(&v);
        let children = adj.successors(v);
        if children.is_empty() {
            return Ok(None);
        }
        for u in children.keys() {
            if *u == start || visited.contains(u) {
                return Ok(None);
            }
            seen.insert(*u);
            if adj.predecessors(*u).keys().all(|p| visited.contains(p)) {
                ready.insert(*u);
            }
        }
        if ready.len() == 1 && seen.len() == 1 {
            if let Some(&t) = ready.iter().next() {
                if seen.contains(&t) {
                    end = Some(t);
                    break;
                }
            }
        }
    }
    let Some(end) = end else {
        return Ok(None);
    };
    if adj.successors(end).contains_key(&end) {
        return Ok(None);
    }

    for interior in visited.iter().filter(|n| **n != start) {
        if let Some(inner) = bulge(g, *interior)? {
            return Ok(Some(inner));
        }
        if let Some(inner) = chain_trimmed(g, *interior)? {
            return Ok(Some(inner));
        }
        if let Some(inner) = bubble(g, *interior)? {
            return Ok(Some(inner));
        }
    }

    let mut nodes = vec![start];
    nodes.extend(visited.into_iter().filter(|n| *n != start));
    nodes.push(end);
    Ok(Some(Motif::with_boundary(MotifKind::Bubble, nodes, start, end)))
}
