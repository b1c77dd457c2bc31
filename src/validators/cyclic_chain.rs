use super::{verify_node_in_graph, Motif, Topology, Validation};
use crate::{
    graph::{not_single_edge, sole_neighbor},
    properties::{MotifKind, NodeId},
};

/// A simple cycle through `start`, reported rotated so that `start` comes first.
///
/// `start` must leave by exactly one edge; every later member must be entered by exactly one
/// edge. The last member may have other successors as long as exactly one edge returns to
/// `start`. A node whose only successor is itself is a cycle of one.
pub fn cyclic_chain<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();

    if adj.predecessors(start).is_empty() || not_single_edge(&adj.successors(start)) {
        return Ok(None);
    }
    let Some(mut curr) = sole_neighbor(&adj.successors(start)) else {
        return Ok(None);
    };
    if curr == start {
        return Ok(Some(Motif::with_boundary(
            MotifKind::CyclicChain,
            vec![start],
            start,
            start,
        )));
    }

    let mut nodes = vec![start];
    loop {
        if not_single_edge(&adj.predecessors(curr)) {
            return Ok(None);
        }
        let succ = adj.successors(curr);
        if not_single_edge(&succ) {
            return match succ.get(&start) {
                Some(back) if back.len() == 1 => {
                    nodes.push(curr);
                    Ok(Some(Motif::with_boundary(
                        MotifKind::CyclicChain,
                        nodes,
                        start,
                        curr,
                    )))
                }
                _ => Ok(None),
            };
        }
        let Some(next) = sole_neighbor(&succ) else {
            return Ok(None);
        };
        nodes.push(curr);
        if next == start {
            return Ok(Some(Motif::with_boundary(
                MotifKind::CyclicChain,
                nodes,
                start,
                curr,
            )));
        }
        curr = next;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::validators::chain;
    use test_log::test;

    #[test]
    fn test_cycle_is_found_rotated_from_every_member() {
        let graph = g(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        for start in 0..4u64 {
            let m = cyclic_chain(&graph, NodeId(start)).unwrap().unwrap();
            let expected: Vec<u64> = (0..4).map(|i| (start + i) % 4).collect();
            assert_eq!(m.nodes, ids(&expected));
            assert_eq!(m.start(), Some(NodeId(start)));
            assert_eq!(m.end(), Some(NodeId((start + 3) % 4)));
            assert_eq!(chain(&graph, NodeId(start)).unwrap(), None);
        }
    }

    #[test]
    fn test_exit_is_only_allowed_from_the_last_member() {
        // 0 → 1 → 2 → 3 → 0, plus 0 → 4
        let graph = g(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)]);
        let m = cyclic_chain(&graph, NodeId(1)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[1, 2, 3, 0]));
        assert_eq!(m.end(), Some(NodeId(0)));
        for start in [0, 2, 3, 4] {
            assert_eq!(cyclic_chain(&graph, NodeId(start)).unwrap(), None, "from {start}");
        }
    }

    #[test]
    fn test_entry_into_the_middle_breaks_the_cycle() {
        // 5 → 2 gives 2 a second predecessor.
        let graph = g(&[(0, 1), (1, 2), (2, 0), (5, 2)]);
        assert_eq!(cyclic_chain(&graph, NodeId(0)).unwrap(), None);
        let m = cyclic_chain(&graph, NodeId(2)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[2, 0, 1]));
    }

    #[test]
    fn test_lone_self_loop_is_a_cycle_of_one() {
        let graph = g(&[(3, 4), (4, 4)]);
        let m = cyclic_chain(&graph, NodeId(4)).unwrap().unwrap();
        assert_eq!(m.nodes, ids(&[4]));
        assert_eq!(m.start(), m.end());
        assert_eq!(cyclic_chain(&graph, NodeId(3)).unwrap(), None);
    }

    #[test]
    fn test_self_loop_with_another_exit_is_not_a_cycle() {
        assert_eq!(cyclic_chain(&g(&[(0, 0), (0, 1)]), NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_parallel_closing_edges_are_rejected() {
        let graph = g(&[(0, 1), (1, 0), (1, 0)]);
        assert_eq!(cyclic_chain(&graph, NodeId(0)).unwrap(), None);
        assert_eq!(cyclic_chain(&graph, NodeId(1)).unwrap(), None);
    }

    #[test]
    fn test_interior_cycle_is_rejected() {
        // 0 → 1 → 2 → 1 never returns to 0.
        let graph = g(&[(5, 0), (0, 1), (1, 2), (2, 1)]);
        assert_eq!(cyclic_chain(&graph, NodeId(0)).unwrap(), None);
    }
}
