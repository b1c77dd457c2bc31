//! The decomposition engine.
//!
//! A run has three phases:
//!
//! 1. **Nested pass.** Bulges, chains, bubbles and cyclic chains are collapsed into Patterns, in
//!    that order of precedence. Each kind keeps its own set of pending candidates, and the next
//!    candidate always comes from the highest-precedence kind that still has one. A collapse
//!    puts every vertex of its connected component back into every set. So the next collapse
//!    is always of the highest kind present anywhere in the graph, and node ids only order
//!    candidates of one kind. Passes repeat until a whole pass collapses nothing.
//! 2. **Top-level pass.** Frayed ropes, then bipartite regions, are collapsed the same way,
//!    with plain nodes as the only candidates. These motifs never contain other Patterns.
//! 3. **Clean-up.** Splits that turned out to be unnecessary are folded back
//!    ([`AssemblyGraph::remove_unnecessary_splits`]) and the result is checked
//!    ([`AssemblyGraph::verify`]), each when enabled in the [`DecomposeConfig`].
//!
//! # Module Organization
//!
//! - [`merge`]: collapsing a motif into a Pattern, including nested-chain flattening
//! - [`splitter`]: splitting a boundary node into left and right halves
//! - [`unsplit`]: the unnecessary-split pass

mod merge;
mod splitter;
mod unsplit;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    components::PatternStats,
    config::DecomposeConfig,
    error::DecompositionError,
    graph::{AssemblyGraph, GraphInput},
    properties::{MotifKind, NodeId},
    validators::{
        bipartite_top_level_only, bubble, bulge, chain_trimmed, cyclic_chain,
        frayed_rope_top_level_only, DecomposedView, Motif, Validation,
    },
};

/// Detector precedence while nesting.
const NESTED_ORDER: [MotifKind; 4] = [
    MotifKind::Bulge,
    MotifKind::Chain,
    MotifKind::Bubble,
    MotifKind::CyclicChain,
];

const TOP_LEVEL_ORDER: [MotifKind; 2] = [MotifKind::FrayedRope, MotifKind::Bipartite];

/// What a run did, for logging and for callers that want numbers without walking the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecompositionSummary {
    /// Patterns left in the final hierarchy, by kind.
    pub patterns: PatternStats,
    /// Collapses performed, flattened chains included.
    pub collapses: usize,
    /// Nested passes run, the final empty one included.
    pub passes: usize,
    pub splits_created: usize,
    pub splits_removed: usize,
    /// Split halves left in the final graph.
    pub split_nodes: usize,
}

/// Drives one decomposition of one graph. The graph is owned for the duration of the run and
/// handed back by [`Decomposer::run`].
#[derive(Debug)]
pub struct Decomposer {
    graph: AssemblyGraph,
    config: DecomposeConfig,
    summary: DecompositionSummary,
}

impl Decomposer {
    pub fn new(graph: AssemblyGraph, config: DecomposeConfig) -> Self {
        Decomposer {
            graph,
            config,
            summary: DecompositionSummary::default(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn run(mut self) -> Result<(AssemblyGraph, DecompositionSummary), DecompositionError> {
        tracing::info!(
            "[decompose] {} nodes, {} edges, motifs {:?}",
            self.graph.nodes().len(),
            self.graph.edges().len(),
            self.config.motifs.iter().map(|k| k.label()).collect::<Vec<_>>()
        );
        self.nested_passes()?;
        self.top_level_pass()?;
        if self.config.remove_unnecessary_splits {
            self.summary.splits_removed = self.graph.remove_unnecessary_splits()?;
        }
        if self.config.verify {
            self.graph.verify()?;
        }

        self.summary.patterns = PatternStats::of_graph(&self.graph);
        self.summary.split_nodes = self.graph.split_nodes().len();
        tracing::info!(
            "[decompose] {} patterns after {} passes; {} splits created, {} removed, {} left",
            self.summary.patterns.total(),
            self.summary.passes,
            self.summary.splits_created,
            self.summary.splits_removed,
            self.summary.split_nodes
        );
        Ok((self.graph, self.summary))
    }

    /// Run nested passes to a fixpoint.
    fn nested_passes(&mut self) -> Result<(), DecompositionError> {
        loop {
            self.summary.passes += 1;
            let collapsed = self.collapse_by_precedence(&NESTED_ORDER, false)?;
            tracing::debug!(
                "[decompose] pass {} done, {collapsed} collapses, {} top-level vertices",
                self.summary.passes,
                self.graph.decomposed_adjacency().node_count()
            );
            if collapsed == 0 {
                return Ok(());
            }
        }
    }

    /// Search for frayed ropes and bipartite regions once, after nesting has converged.
    fn top_level_pass(&mut self) -> Result<(), DecompositionError> {
        let collapsed = self.collapse_by_precedence(&TOP_LEVEL_ORDER, true)?;
        tracing::debug!("[decompose] top-level pass done, {collapsed} collapses");
        Ok(())
    }

    /// Collapse motifs of the enabled kinds in `order` until none is left, returning how many
    /// were collapsed.
    ///
    /// Candidates of a lower kind are only tried once no higher kind has a candidate pending.
    /// With `plain_only`, Patterns are never candidates.
    fn collapse_by_precedence(
        &mut self,
        order: &[MotifKind],
        plain_only: bool,
    ) -> Result<usize, DecompositionError> {
        let kinds: Vec<MotifKind> = order
            .iter()
            .copied()
            .filter(|k| self.config.enabled(*k))
            .collect();
        let admitted = self.admit(self.graph.top_level(), plain_only);
        let mut pending: Vec<BTreeSet<NodeId>> = kinds.iter().map(|_| admitted.clone()).collect();

        let mut collapsed = 0;
        while let Some(rank) = pending.iter().position(|set| !set.is_empty()) {
            let Some(candidate) = pending[rank].pop_first() else {
                continue;
            };
            if !self.graph.decomposed_adjacency().contains(candidate) {
                continue;
            }
            let Some(motif) = self.find(kinds[rank], candidate)? else {
                continue;
            };
            let done = self.apply(&motif)?;
            collapsed += 1;
            let touched = self.graph.decomposed_adjacency().component_of(done.pattern);
            let touched = self.admit(touched, plain_only);
            for set in pending.iter_mut() {
                set.extend(touched.iter().copied());
            }
        }
        Ok(collapsed)
    }

    fn admit(
        &self,
        vertices: impl IntoIterator<Item = NodeId>,
        plain_only: bool,
    ) -> BTreeSet<NodeId> {
        vertices
            .into_iter()
            .filter(|v| !plain_only || !self.graph.is_pattern(*v))
            .collect()
    }

    /// Collapse `motif` and account for it in the summary.
    fn apply(&mut self, motif: &Motif) -> Result<merge::Collapsed, DecompositionError> {
        let done = self.graph.collapse(motif)?;
        self.summary.collapses += 1 + done.absorbed.len();
        self.summary.splits_created += done.outside_halves.len();
        Ok(done)
    }

    /// The motif of `kind` starting at `candidate`, if any. A detector may report a smaller
    /// motif of another kind (bubble minimality); that motif is only used if its kind is
    /// enabled too.
    fn find(&self, kind: MotifKind, candidate: NodeId) -> Validation {
        let view = DecomposedView(&self.graph);
        let found = match kind {
            MotifKind::Bulge => bulge(&view, candidate)?,
            MotifKind::Chain => chain_trimmed(&view, candidate)?,
            MotifKind::Bubble => bubble(&view, candidate)?,
            MotifKind::CyclicChain => cyclic_chain(&view, candidate)?,
            MotifKind::FrayedRope => frayed_rope_top_level_only(&view, candidate)?,
            MotifKind::Bipartite => bipartite_top_level_only(&view, candidate)?,
        };
        Ok(found.filter(|m| self.config.enabled(m.kind)))
    }
}

/// Ingest `input` and decompose it in one step.
pub fn decompose(
    input: GraphInput,
    config: &DecomposeConfig,
) -> Result<(AssemblyGraph, DecompositionSummary), DecompositionError> {
    let graph = AssemblyGraph::from_input(input, config)?;
    Decomposer::new(graph, config.clone()).run()
}
