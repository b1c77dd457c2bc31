use super::{verify_node_in_graph, Motif, Topology, Validation};
use crate::{graph::sole_neighbor, properties::MotifKind, properties::NodeId};

/// Two or more parallel edges from `start` to a single end node, which `start` is the only
/// predecessor of. Edges from the end back to `start` are allowed.
pub fn bulge<T: Topology + ?Sized>(g: &T, start: NodeId) -> Validation {
    verify_node_in_graph(g, start)?;
    let adj = g.adjacency();
    let succ = adj.successors(start);
    let Some(end) = sole_neighbor(&succ) else {
        return Ok(None);
    };
    if end == start || sole_neighbor(&adj.predecessors(end)) != Some(start) {
        return Ok(None);
    }
    if succ[&end].len() < 2 {
        return Ok(None);
    }
    Ok(Some(Motif::with_boundary(
        MotifKind::Bulge,
        vec![start, end],
        start,
        end,
    )))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use test_log::test;

    #[test]
    fn test_simple_bulge() {
        let graph = g(&[(0, 1), (0, 1), (0, 1)]);
        let m = bulge(&graph, NodeId(0)).unwrap().unwrap();
        assert_eq!(m.kind, MotifKind::Bulge);
        assert_eq!(m.nodes, ids(&[0, 1]));
        assert_eq!(m.start(), Some(NodeId(0)));
        assert_eq!(m.end(), Some(NodeId(1)));
        assert_eq!(bulge(&graph, NodeId(1)).unwrap(), None);
    }

    #[test]
    fn test_single_edge_is_not_a_bulge() {
        assert_eq!(bulge(&g(&[(0, 1), (1, 2)]), NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_end_with_other_predecessors_is_not_a_bulge() {
        let graph = g(&[(0, 1), (0, 1), (2, 1)]);
        assert_eq!(bulge(&graph, NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_start_with_other_successors_is_not_a_bulge() {
        let graph = g(&[(0, 1), (0, 1), (0, 2)]);
        assert_eq!(bulge(&graph, NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_cyclic_bulge_allowed() {
        let graph = g(&[(0, 1), (0, 1), (1, 0)]);
        assert!(bulge(&graph, NodeId(0)).unwrap().is_some());
    }

    #[test]
    fn test_parallel_self_loops_are_not_a_bulge() {
        assert_eq!(bulge(&g(&[(0, 0), (0, 0)]), NodeId(0)).unwrap(), None);
    }

    #[test]
    fn test_missing_candidate_is_an_invariant_error() {
        let err = bulge(&g(&[(0, 1)]), NodeId(5)).unwrap_err();
        assert!(err.is_invariant());
    }
}
