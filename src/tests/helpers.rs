//! Shared fixtures for decomposition tests

use crate::{
    config::DecomposeConfig,
    decompose::{decompose, DecompositionSummary},
    graph::{AssemblyGraph, EdgeRecord, GraphInput, NodeRecord},
    properties::{
        Attributes, EdgeId, MotifKind, NodeId, LENGTH_ATTRIBUTE, ORIENTATION_ATTRIBUTE,
    },
};
use serde_json::json;
use std::collections::BTreeSet;

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// 0 → 1 → {2, 3} → 4
pub const BUBBLE_IN_CHAIN: [(u64, u64); 5] = [(0, 1), (1, 2), (1, 3), (2, 4), (3, 4)];

/// Two frayed ropes sharing node 4.
pub const FRAYED_ROPES: [(u64, u64); 8] = [
    (0, 2),
    (1, 2),
    (2, 3),
    (2, 4),
    (4, 5),
    (6, 5),
    (5, 7),
    (5, 8),
];

pub fn decompose_with(
    edges: &[(u64, u64)],
    config: &DecomposeConfig,
) -> (AssemblyGraph, DecompositionSummary) {
    init_logging();
    decompose(GraphInput::from_edge_list(edges), config).unwrap()
}

pub fn decompose_edges(edges: &[(u64, u64)]) -> (AssemblyGraph, DecompositionSummary) {
    decompose_with(edges, &DecomposeConfig::default())
}

pub fn without_unsplit() -> DecomposeConfig {
    DecomposeConfig {
        remove_unnecessary_splits: false,
        ..Default::default()
    }
}

fn contig(id: u64, name: &str, orientation: &str) -> NodeRecord {
    let mut attributes = Attributes::new();
    attributes.insert(LENGTH_ATTRIBUTE.to_string(), json!(1000 + id));
    attributes.insert(ORIENTATION_ATTRIBUTE.to_string(), json!(orientation));
    NodeRecord {
        id,
        name: Some(name.to_string()),
        attributes,
    }
}

/// Two unrelated regions of an assembly, each present on both strands.
///
/// Region one is `a → b → {c, d} → e` (ids 0..=4 forward, 10..=14 reverse), region two is
/// `f → {g, h} → i → j` (ids 5..=9 forward, 15..=19 reverse). A reverse-strand node has the
/// forward id plus 10 and every edge is mirrored.
pub fn reverse_complement_regions() -> GraphInput {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
    let mut nodes = Vec::new();
    for (i, name) in names.iter().enumerate() {
        nodes.push(contig(i as u64, name, "+"));
        nodes.push(contig(i as u64 + 10, name, "-"));
    }
    let forward = [
        (0, 1),
        (1, 2),
        (1, 3),
        (2, 4),
        (3, 4),
        (5, 6),
        (5, 7),
        (6, 8),
        (7, 8),
        (8, 9),
    ];
    let mut edges = Vec::new();
    for (source, target) in forward {
        edges.push((source, target));
        edges.push((target + 10, source + 10));
    }
    let edges = edges
        .into_iter()
        .enumerate()
        .map(|(i, (source, target))| EdgeRecord {
            id: i as u64,
            source,
            target,
            attributes: Attributes::new(),
        })
        .collect();
    GraphInput { nodes, edges }
}

/// Every plain node and edge reachable by expanding the decomposed view.
pub fn expand_all(graph: &AssemblyGraph) -> (BTreeSet<NodeId>, BTreeSet<EdgeId>) {
    let mut nodes = BTreeSet::new();
    let mut edges: BTreeSet<EdgeId> = graph
        .decomposed_adjacency()
        .edges()
        .map(|(e, _, _)| e)
        .collect();
    for id in graph.top_level() {
        if graph.is_pattern(id) {
            let below = graph.descendants(id).unwrap();
            nodes.extend(below.nodes);
            edges.extend(below.edges);
        } else {
            nodes.insert(id);
        }
    }
    (nodes, edges)
}

/// The hierarchy without Pattern ids: each Pattern's kind and the ingested ids beneath it.
pub fn shape(graph: &AssemblyGraph) -> BTreeSet<(MotifKind, BTreeSet<u64>)> {
    graph
        .patterns()
        .keys()
        .map(|id| {
            let below = graph.descendants(*id).unwrap();
            let base = below
                .nodes
                .iter()
                .map(|n| graph.node(*n).unwrap().base_id.0)
                .collect();
            (graph.pattern(*id).unwrap().kind, base)
        })
        .collect()
}

pub fn set(ids: &[u64]) -> BTreeSet<u64> {
    ids.iter().copied().collect()
}
