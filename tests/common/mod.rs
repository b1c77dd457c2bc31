//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use motifscope_core::{
    config::DecomposeConfig,
    decompose::{decompose, DecompositionSummary},
    graph::{AssemblyGraph, GraphInput},
    properties::MotifKind,
    DecompositionError,
};
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// 0 → 1 → {2, 3} → 4
#[allow(dead_code)]
pub const BUBBLE_IN_CHAIN: [(u64, u64); 5] = [(0, 1), (1, 2), (1, 3), (2, 4), (3, 4)];

/// {0, 1} → 2 → {3, 4} and {4, 6} → 5 → {7, 8}
#[allow(dead_code)]
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

#[allow(dead_code)]
pub fn decompose_edges(edges: &[(u64, u64)]) -> (AssemblyGraph, DecompositionSummary) {
    init_logging();
    decompose(GraphInput::from_edge_list(edges), &DecomposeConfig::default()).unwrap()
}

/// Decompose with verification on and split removal switched by `unsplit`, keeping the error.
#[allow(dead_code)]
pub fn try_decompose_edges(
    edges: &[(u64, u64)],
    unsplit: bool,
) -> Result<(AssemblyGraph, DecompositionSummary), DecompositionError> {
    init_logging();
    let config = DecomposeConfig {
        remove_unnecessary_splits: unsplit,
        verify: true,
        ..DecomposeConfig::default()
    };
    decompose(GraphInput::from_edge_list(edges), &config)
}

/// A path of `head` nodes, one bubble with two branches, then a path of `tail` nodes.
/// Ids run from 0 in path order; returns the edges and the node count.
#[allow(dead_code)]
pub fn bubble_on_a_path(head: u64, tail: u64) -> (Vec<(u64, u64)>, u64) {
    let mut edges = Vec::new();
    for i in 0..head {
        edges.push((i, i + 1));
    }
    let start = head;
    let (upper, lower, end) = (start + 1, start + 2, start + 3);
    edges.extend([(start, upper), (start, lower), (upper, end), (lower, end)]);
    for i in 0..tail {
        edges.push((end + i, end + i + 1));
    }
    (edges, end + tail + 1)
}

/// Relabel every endpoint through `perm`, keeping edge order.
#[allow(dead_code)]
pub fn relabel(edges: &[(u64, u64)], perm: &[u64]) -> Vec<(u64, u64)> {
    edges
        .iter()
        .map(|(s, t)| (perm[*s as usize], perm[*t as usize]))
        .collect()
}

/// The hierarchy without Pattern ids: each Pattern's kind and the ingested ids beneath it,
/// mapped back through `unlabel`.
#[allow(dead_code)]
pub fn shape(
    graph: &AssemblyGraph,
    unlabel: &BTreeMap<u64, u64>,
) -> BTreeSet<(MotifKind, BTreeSet<u64>)> {
    graph
        .patterns()
        .values()
        .map(|p| {
            let below = graph.descendants(p.id).unwrap();
            let ids = below
                .nodes
                .iter()
                .map(|n| {
                    let base = graph.node(*n).unwrap().base_id.0;
                    unlabel.get(&base).copied().unwrap_or(base)
                })
                .collect();
            (p.kind, ids)
        })
        .collect()
}

/// The labelling `i → n - 1 - i` over the ids an edge list uses.
#[allow(dead_code)]
pub fn reversed(edges: &[(u64, u64)]) -> Vec<u64> {
    let n = edges.iter().map(|(s, t)| (*s).max(*t) + 1).max().unwrap_or(0);
    (0..n).rev().collect()
}

#[allow(dead_code)]
pub fn inverse(perm: &[u64]) -> BTreeMap<u64, u64> {
    perm.iter()
        .enumerate()
        .map(|(original, label)| (*label, original as u64))
        .collect()
}

/// Write `input` as `graph.json` under `temp_dir`.
#[allow(dead_code)]
pub fn write_graph_json(temp_dir: &TempDir, input: &GraphInput) -> PathBuf {
    let path = temp_dir.path().join("graph.json");
    std::fs::write(&path, serde_json::to_string_pretty(input).unwrap()).unwrap();
    path
}
