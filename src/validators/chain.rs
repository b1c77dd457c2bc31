use super::{is_trivial_fake_edge, verify_node_in_graph, Motif, Topology, Validation};
use crate::{
    graph::{not_single_edge, sole_neighbor},
    properties::{MotifKind, NodeId},
};

/// The maximal simple path through `start` in which every interior node has exactly one
/// incoming and one outgoing edge.
///
/// The path is grown forward from `start` and then backward, so any member of a chain finds the
/// whole chain. Paths that close back on themselves are rejected here and left to
/// [super::cyclic_chain].
pub fn chain<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();

    let Some(first) = sole_neighbor(&adj.successors(start)) else {
        return Ok(None);
    };
    if first == start {
        return Ok(None);
    }

    let mut forward = vec![start];
    let mut curr = first;
    loop {
        if not_single_edge(&adj.predecessors(curr)) {
            break;
        }
        let succ = adj.successors(curr);
        if not_single_edge(&succ) {
            if succ.contains_key(&start) {
                return Ok(None);
            }
            forward.push(curr);
            break;
        }
        let Some(next) = sole_neighbor(&succ) else {
            break;
        };
        if next == start {
            return Ok(None);
        }
        forward.push(curr);
        if next == curr {
            break;
        }
        curr = next;
    }
    if forward.len() <= 1 {
        return Ok(None);
    }

    let mut backward = Vec::new();
    let mut curr = start;
    loop {
        let pred = adj.predecessors(curr);
        if not_single_edge(&pred) {
            break;
        }
        let Some(p) = sole_neighbor(&pred) else {
            break;
        };
        if not_single_edge(&adj.successors(p)) {
            break;
        }
        if p == curr || forward.contains(&p) || backward.contains(&p) {
            return Ok(None);
        }
        if adj
            .predecessors(p)
            .keys()
            .any(|pp| forward.contains(pp) || backward.contains(pp))
        {
            return Ok(None);
        }
        backward.push(p);
        curr = p;
    }

    backward.reverse();
    backward.extend(forward);
    let nodes = backward;
    let (first, last) = (nodes[0], nodes[nodes.len() - 1]);
    Ok(Some(Motif::with_boundary(MotifKind::Chain, nodes, first, last)))
}

/// [chain], minus a trivial fake edge at either end.
///
/// After a boundary node is split, the outer half hangs off the new Pattern by a fake edge; a
/// chain that only adds that half back is not progress, so such an end member is trimmed and a
/// chain reduced to one member is rejected.
pub fn chain_trimmed<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    let Some(found) = chain(g, start)? else {
        return Ok(None);
    };
    let mut nodes = found.nodes;
    if nodes.len() >= 2 && is_trivial_fake_edge(g, nodes[0], nodes[1])? {
        nodes.remove(0);
    }
    let n = nodes.len();
    if n >= 2 && is_trivial_fake_edge(g, nodes[n - 2], nodes[n - 1])? {
        nodes.pop();
    }
    if nodes.len() < 2 {
        return Ok(None);
    }
    let (first, last) = (nodes[0], nodes[nodes.len() - 1]);
    Ok(Some(Motif::with_boundary(MotifKind::Chain, nodes, first, last)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::properties::EdgeId;
    use std::collections::BTreeSet;
    use test_log::test;

    #[test]
    fn test_straight_path_found_from_every_interior_node() {
        let graph = g(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        for start in 0..5 {
            let m = chain(&graph, NodeId(start)).unwrap().unwrap();
            assert_eq!(m.nodes, ids(&[0, 1, 2, 3, 4, 5]), "from {start}");
            assert_eq!(m.start(), Some(NodeId(0)));
            assert_eq!(m.end(), Some(NodeId(5)));
        }
        // The sink has nowhere to grow forward from.
        assert_eq!(chain(&graph, NodeId(5)).unwrap(), None);
    }

    #[test]
    fn test_chain_stops_at_branches() {
        // 9 → 0 → 1 → 2 → {3, 4}; 8 → 9 and 7 → 9
        let graph = g(&[(8, 9), (7, 9), (9, 0), (0, 1), (1, 2), (2, 3), (2, 4)]);
        let m = chain(&graph, NodeId(1)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[9, 0, 1, 2]));
    }

    #[test]
    fn test_chain_does_not_enter_a_merge() {
        // 0 → 1 → 2 ← 5: 2 has two predecessors, so the chain ends at 1.
        let graph = g(&[(0, 1), (1, 2), (5, 2)]);
        assert_eq!(chain(&graph, NodeId(0)).unwrap().unwrap().nodes, ids(&[0, 1]));
        assert_eq!(chain(&graph, NodeId(1)).unwrap(), None);
    }

    #[test]
    fn test_cycle_is_not_a_chain() {
        let graph = g(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        for start in 0..4 {
            assert_eq!(chain(&graph, NodeId(start)).unwrap(), None, "from {start}");
        }
    }

    #[test]
    fn test_cycle_through_a_branch_is_not_a_chain() {
        // 0 → 1 → 2 → {0, 3}
        let graph = g(&[(0, 1), (1, 2), (2, 0), (2, 3)]);
        assert_eq!(chain(&graph, NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_backward_extension_rejects_loops_into_the_chain() {
        // 0 → 1 → 2 → {3, 5}, 5 → 4 → 0
        let graph = g(&[(0, 1), (1, 2), (2, 3), (2, 5), (5, 4), (4, 0)]);
        assert_eq!(chain(&graph, NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_parallel_edges_break_chains() {
        let graph = g(&[(0, 1), (0, 1), (1, 2)]);
        assert_eq!(chain(&graph, NodeId(0)).unwrap(), None);
        assert_eq!(chain(&graph, NodeId(1)).unwrap().unwrap().nodes, ids(&[1, 2]));
    }

    #[test]
    fn test_self_loop_is_not_a_chain() {
        assert_eq!(chain(&g(&[(0, 0)]), NodeId(0)).unwrap(), None);
    }

    fn marked(edges: &[(u64, u64)], fake: &[u64], patterns: &[u64]) -> Marked {
        Marked {
            adjacency: g(edges),
            fake: fake.iter().map(|e| EdgeId(*e)).collect(),
            patterns: patterns.iter().map(|p| NodeId(*p)).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_trivial_fake_edges_are_trimmed() {
        // 10 is a Pattern; 5 is the split half left outside it: 5 →(fake) 10 → 6 → 7
        let graph = marked(&[(5, 10), (10, 6), (6, 7)], &[0], &[10]);
        let m = chain_trimmed(&graph, NodeId(5)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[10, 6, 7]));

        // Trimming down to a single member rejects the chain.
        let graph = marked(&[(5, 10)], &[0], &[10]);
        assert_eq!(chain_trimmed(&graph, NodeId(5)).unwrap(), None);
        assert!(chain(&graph, NodeId(5)).unwrap().is_some());
    }

    #[test]
    fn test_fake_edge_between_patterns_is_kept() {
        let graph = marked(&[(10, 11)], &[0], &[10, 11]);
        let m = chain_trimmed(&graph, NodeId(10)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[10, 11]));
    }

    #[test]
    fn test_fake_edge_between_plain_nodes_is_an_invariant_error() {
        let graph = marked(&[(1, 2)], &[0], &[]);
        assert!(chain_trimmed(&graph, NodeId(1)).unwrap_err().is_invariant());
    }
}
