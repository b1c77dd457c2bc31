//! Node ids only decide the order candidates of one kind are tried in. These tests relabel
//! fixtures and random graphs and check that the hierarchy comes out the same every time.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::*;
use motifscope_core::properties::MotifKind;
use proptest::prelude::*;
use test_log::test;

/// Every ordering of `0..n`, by Heap's algorithm.
fn permutations(n: usize) -> Vec<Vec<u64>> {
    fn heap(k: usize, current: &mut Vec<u64>, out: &mut Vec<Vec<u64>>) {
        if k <= 1 {
            out.push(current.clone());
            return;
        }
        heap(k - 1, current, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                current.swap(i, k - 1);
            } else {
                current.swap(0, k - 1);
            }
            heap(k - 1, current, out);
        }
    }
    let mut current: Vec<u64> = (0..n as u64).collect();
    let mut out = Vec::new();
    heap(n, &mut current, &mut out);
    out
}

fn set(ids: impl IntoIterator<Item = u64>) -> BTreeSet<u64> {
    ids.into_iter().collect()
}

#[test]
fn test_permutations_cover_every_ordering() {
    let all = permutations(4);
    assert_eq!(all.len(), 24);
    assert_eq!(all.iter().collect::<BTreeSet<_>>().len(), 24);
}

#[test]
fn test_bubble_in_chain_under_every_relabelling() {
    let expected: BTreeSet<_> = [
        (MotifKind::Chain, set(0..=4)),
        (MotifKind::Bubble, set(1..=4)),
    ]
    .into_iter()
    .collect();
    for perm in permutations(5) {
        let (graph, summary) = decompose_edges(&relabel(&BUBBLE_IN_CHAIN, &perm));
        assert_eq!(shape(&graph, &inverse(&perm)), expected, "labels {perm:?}");
        assert_eq!(summary.split_nodes, 0, "labels {perm:?}");

        let bubble = graph
            .patterns()
            .values()
            .find(|p| p.kind == MotifKind::Bubble)
            .unwrap();
        assert_eq!(bubble.start().map(|n| n.0), Some(perm[1]));
        assert_eq!(bubble.end().map(|n| n.0), Some(perm[4]));
    }
}

#[test]
fn test_straight_path_under_every_relabelling() {
    let edges: Vec<(u64, u64)> = (0..5).map(|i| (i, i + 1)).collect();
    for perm in permutations(6) {
        let (graph, summary) = decompose_edges(&relabel(&edges, &perm));
        assert_eq!(summary.patterns.total(), 1);
        assert_eq!(summary.collapses, 1);
        let chain = graph.pattern(graph.top_level()[0]).unwrap();
        assert_eq!(chain.start().map(|n| n.0), Some(perm[0]));
        assert_eq!(chain.end().map(|n| n.0), Some(perm[5]));
    }
}

/// Shape of one decomposition next to the shape under `perm`, mapped back to the first labels.
fn both_shapes(
    edges: &[(u64, u64)],
    perm: &[u64],
    unsplit: bool,
) -> (
    BTreeSet<(MotifKind, BTreeSet<u64>)>,
    BTreeSet<(MotifKind, BTreeSet<u64>)>,
) {
    let (graph, _) = try_decompose_edges(edges, unsplit)
        .unwrap_or_else(|err| panic!("{edges:?}: {err}"));
    let relabelled = relabel(edges, perm);
    let (other, _) = try_decompose_edges(&relabelled, unsplit)
        .unwrap_or_else(|err| panic!("{relabelled:?}: {err}"));
    (
        shape(&graph, &BTreeMap::new()),
        shape(&other, &inverse(perm)),
    )
}

#[test]
fn test_bubble_beats_a_cycle_through_its_boundary() {
    // 4 → {1, 6, 8}, 8 → 1, 1 → 6 twice and 6 → 4, with a bulge from 0 to 7 beside it.
    let edges = [
        (4, 6),
        (4, 8),
        (0, 7),
        (1, 6),
        (0, 7),
        (4, 1),
        (1, 6),
        (8, 1),
        (6, 4),
    ];
    let expected: BTreeSet<_> = [
        (MotifKind::Bulge, set([0, 7])),
        (MotifKind::Bubble, set([1, 4, 6, 8])),
    ]
    .into_iter()
    .collect();
    for unsplit in [false, true] {
        let (plain, reversed_back) = both_shapes(&edges, &reversed(&edges), unsplit);
        assert_eq!(plain, expected, "unsplit {unsplit}");
        assert_eq!(reversed_back, expected, "unsplit {unsplit}");
    }
}

#[test]
fn test_chain_found_before_the_cycles_beside_it() {
    let edges = [
        (5, 2),
        (1, 0),
        (2, 1),
        (3, 4),
        (2, 3),
        (4, 5),
        (4, 3),
        (2, 1),
        (0, 1),
        (2, 3),
    ];
    let expected: BTreeSet<_> = [
        (MotifKind::Chain, set([2, 5])),
        (MotifKind::CyclicChain, set([0, 1])),
        (MotifKind::CyclicChain, set([3, 4])),
    ]
    .into_iter()
    .collect();
    for unsplit in [false, true] {
        let (plain, reversed_back) = both_shapes(&edges, &reversed(&edges), unsplit);
        assert_eq!(plain, expected, "unsplit {unsplit}");
        assert_eq!(reversed_back, expected, "unsplit {unsplit}");
    }
    let (_, summary) = try_decompose_edges(&edges, true).unwrap();
    assert_eq!(summary.split_nodes, 0);
}

/// Up to nine ids and twelve edges, self-loops and parallel edges included, with a shuffled
/// labelling of the same ids.
fn small_multigraph() -> impl Strategy<Value = (Vec<(u64, u64)>, Vec<u64>)> {
    (2..=9u64).prop_flat_map(|n| {
        (
            prop::collection::vec((0..n, 0..n), 1..=12),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_graphs_ignore_labels((edges, perm) in small_multigraph(), unsplit in any::<bool>()) {
        let (graph, _) = try_decompose_edges(&edges, unsplit)
            .map_err(|err| TestCaseError::fail(format!("{edges:?}: {err}")))?;
        let relabelled = relabel(&edges, &perm);
        let (other, _) = try_decompose_edges(&relabelled, unsplit)
            .map_err(|err| TestCaseError::fail(format!("{relabelled:?}: {err}")))?;
        prop_assert_eq!(
            shape(&graph, &BTreeMap::new()),
            shape(&other, &inverse(&perm)),
            "{:?} relabelled {:?}",
            edges,
            perm
        );

        let reversed_labels = reversed(&edges);
        let (back, _) = try_decompose_edges(&relabel(&edges, &reversed_labels), unsplit)
            .map_err(|err| TestCaseError::fail(format!("{edges:?} reversed: {err}")))?;
        prop_assert_eq!(
            shape(&graph, &BTreeMap::new()),
            shape(&back, &inverse(&reversed_labels)),
            "{:?} reversed",
            edges
        );
    }

    #[test]
    fn frayed_ropes_ignore_labels(
        perm in Just((0..9u64).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let (graph, summary) = decompose_edges(&relabel(&FRAYED_ROPES, &perm));
        let expected: BTreeSet<_> = [
            (MotifKind::FrayedRope, set(0..=3)),
            (MotifKind::FrayedRope, set(4..=8)),
        ]
        .into_iter()
        .collect();
        prop_assert_eq!(shape(&graph, &inverse(&perm)), expected);
        prop_assert_eq!(summary.split_nodes, 0);
    }

    /// A bubble on a path ends up inside one flat chain: chains found on either side of the
    /// bubble are merged into the outer chain instead of nesting.
    #[test]
    fn chains_of_chains_flatten(
        (head, tail, perm) in (0..4u64, 0..4u64)
            .prop_filter("a bare bubble has no chain", |(h, t)| h + t > 0)
            .prop_flat_map(|(h, t)| {
                let n = h + t + 4;
                (Just(h), Just(t), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
            })
    ) {
        let (edges, n) = bubble_on_a_path(head, tail);
        let (graph, summary) = decompose_edges(&relabel(&edges, &perm));

        let expected: BTreeSet<_> = [
            (MotifKind::Chain, set(0..n)),
            (MotifKind::Bubble, set(head..head + 4)),
        ]
        .into_iter()
        .collect();
        prop_assert_eq!(shape(&graph, &inverse(&perm)), expected);
        prop_assert_eq!(summary.split_nodes, 0);
        prop_assert_eq!(graph.top_level().len(), 1);

        for p in graph.patterns().values().filter(|p| p.kind == MotifKind::Chain) {
            for child in p.nodes.iter() {
                let nested = graph.pattern(*child).map(|c| c.kind);
                prop_assert_ne!(nested, Some(MotifKind::Chain));
            }
        }
    }
}

#[test]
fn test_inverse_undoes_relabel() {
    let perm = vec![3, 0, 2, 1];
    let back: BTreeMap<u64, u64> = inverse(&perm);
    for (original, label) in perm.iter().enumerate() {
        assert_eq!(back[label], original as u64);
    }
}
