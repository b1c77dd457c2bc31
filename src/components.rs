//! Component bookkeeping for a finished decomposition.
//!
//! The decomposed graph is partitioned into weakly connected components, each of which is
//! expanded down to plain nodes and edges and counted. Components are then ranked by size and
//! numbered from 1 so consumers can ask for "component 3" and get the same answer every run.

use std::{cmp::Reverse, collections::BTreeSet, fmt::Write, ops::AddAssign};

use serde::{Deserialize, Serialize};

use crate::{
    error::DecompositionError,
    graph::{weakly_connected_components, AssemblyGraph},
    properties::{EdgeId, EnumSet, MotifKind, NodeId},
};

/// Number of Patterns of each motif kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStats {
    pub bulges: usize,
    pub chains: usize,
    pub cyclic_chains: usize,
    pub bubbles: usize,
    pub frayed_ropes: usize,
    pub bipartites: usize,
}

impl PatternStats {
    pub fn record(&mut self, kind: MotifKind) {
        *self.count_mut(kind) += 1;
    }

    pub fn count(&self, kind: MotifKind) -> usize {
        match kind {
            MotifKind::Bulge => self.bulges,
            MotifKind::Chain => self.chains,
            MotifKind::CyclicChain => self.cyclic_chains,
            MotifKind::Bubble => self.bubbles,
            MotifKind::FrayedRope => self.frayed_ropes,
            MotifKind::Bipartite => self.bipartites,
        }
    }

    fn count_mut(&mut self, kind: MotifKind) -> &mut usize {
        match kind {
            MotifKind::Bulge => &mut self.bulges,
            MotifKind::Chain => &mut self.chains,
            MotifKind::CyclicChain => &mut self.cyclic_chains,
            MotifKind::Bubble => &mut self.bubbles,
            MotifKind::FrayedRope => &mut self.frayed_ropes,
            MotifKind::Bipartite => &mut self.bipartites,
        }
    }

    pub fn total(&self) -> usize {
        self.bulges
            + self.chains
            + self.cyclic_chains
            + self.bubbles
            + self.frayed_ropes
            + self.bipartites
    }

    /// Counts over every Pattern in `graph`, nested ones included.
    pub fn of_graph(graph: &AssemblyGraph) -> Self {
        let mut stats = PatternStats::default();
        for p in graph.patterns().values() {
            stats.record(p.kind);
        }
        stats
    }
}

impl AddAssign for PatternStats {
    fn add_assign(&mut self, other: Self) {
        self.bulges += other.bulges;
        self.chains += other.chains;
        self.cyclic_chains += other.cyclic_chains;
        self.bubbles += other.bubbles;
        self.frayed_ropes += other.frayed_ropes;
        self.bipartites += other.bipartites;
    }
}

/// One weakly connected component of the decomposed graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// 1-based rank; component 1 is the largest.
    pub number: usize,
    /// Vertices of the decomposed graph: plain nodes and top-level Patterns.
    pub top_level: BTreeSet<NodeId>,
    /// Every plain node, split halves included, at any depth.
    pub nodes: BTreeSet<NodeId>,
    /// Every edge, real and fake, at any depth.
    pub edges: BTreeSet<EdgeId>,
    /// Every Pattern at any depth.
    pub patterns: BTreeSet<NodeId>,
    pub unsplit_node_count: usize,
    pub split_node_count: usize,
    /// Nodes as the input knew them: each pair of split halves counts once.
    pub full_node_count: usize,
    pub real_edge_count: usize,
    pub fake_edge_count: usize,
    pub pattern_stats: PatternStats,
}

impl Component {
    pub fn node_count(&self) -> usize {
        self.unsplit_node_count + self.split_node_count
    }

    pub fn edge_count(&self) -> usize {
        self.real_edge_count + self.fake_edge_count
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id) || self.patterns.contains(&id)
    }

    fn expand(
        graph: &AssemblyGraph,
        top_level: BTreeSet<NodeId>,
    ) -> Result<Self, DecompositionError> {
        let mut nodes = BTreeSet::new();
        let mut edges = BTreeSet::new();
        let mut patterns = BTreeSet::new();
        for id in top_level.iter() {
            if graph.is_pattern(*id) {
                let below = graph.descendants(*id)?;
                patterns.insert(*id);
                patterns.extend(below.patterns);
                nodes.extend(below.nodes);
                edges.extend(below.edges);
            } else {
                nodes.insert(*id);
            }
            for out in graph.decomposed_adjacency().successors(*id).values() {
                edges.extend(out.iter().copied());
            }
        }

        let mut split_node_count = 0;
        for n in nodes.iter() {
            if graph.node_ref(*n)?.is_split() {
                split_node_count += 1;
            }
        }
        let mut fake_edge_count = 0;
        for e in edges.iter() {
            if graph.edge_ref(*e)?.fake {
                fake_edge_count += 1;
            }
        }
        let mut pattern_stats = PatternStats::default();
        for p in patterns.iter() {
            pattern_stats.record(graph.pattern_ref(*p)?.kind);
        }
        let unsplit_node_count = nodes.len() - split_node_count;
        Ok(Component {
            number: 0,
            unsplit_node_count,
            split_node_count,
            full_node_count: unsplit_node_count + split_node_count / 2,
            real_edge_count: edges.len() - fake_edge_count,
            fake_edge_count,
            pattern_stats,
            top_level,
            nodes,
            edges,
            patterns,
        })
    }

    fn rank_key(&self) -> (Reverse<usize>, Reverse<usize>, Reverse<usize>, Option<NodeId>) {
        (
            Reverse(self.full_node_count),
            Reverse(self.edge_count()),
            Reverse(self.pattern_stats.total()),
            self.nodes.first().copied(),
        )
    }
}

/// Every component of a decomposed graph, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components(pub Vec<Component>);

impl Components {
    #[tracing::instrument(skip_all)]
    pub fn record(graph: &AssemblyGraph) -> Result<Self, DecompositionError> {
        let mut components = weakly_connected_components(graph.decomposed_adjacency())
            .into_iter()
            .map(|vertices| Component::expand(graph, vertices))
            .collect::<Result<Vec<_>, _>>()?;
        components.sort_by_key(|c| c.rank_key());
        for (i, c) in components.iter_mut().enumerate() {
            c.number = i + 1;
        }
        tracing::info!(
            "[components] {} components; largest has {} nodes",
            components.len(),
            components.first().map(|c| c.full_node_count).unwrap_or(0)
        );
        Ok(Components(components))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.0.iter()
    }

    /// Look a component up by its 1-based number.
    pub fn get(&self, number: usize) -> Result<&Component, DecompositionError> {
        number
            .checked_sub(1)
            .and_then(|i| self.0.get(i))
            .ok_or_else(|| {
                DecompositionError::NotFound(format!(
                    "component {number} (there are {} components)",
                    self.0.len()
                ))
            })
    }

    /// The component holding a plain node or Pattern.
    pub fn containing(&self, id: NodeId) -> Option<&Component> {
        self.0.iter().find(|c| c.contains(id))
    }

    /// A plain-text summary table, one row per component.
    pub fn render_table(&self) -> Result<String, DecompositionError> {
        let mut out = String::new();
        writeln!(
            out,
            "{:>4} {:>8} {:>8} {:>6} {:>8} {:>6} {:>9}  patterns by kind",
            "#", "nodes", "unsplit", "split", "edges", "fake", "patterns"
        )?;
        for c in self.0.iter() {
            write!(
                out,
                "{:>4} {:>8} {:>8} {:>6} {:>8} {:>6} {:>9} ",
                c.number,
                c.full_node_count,
                c.unsplit_node_count,
                c.split_node_count,
                c.real_edge_count,
                c.fake_edge_count,
                c.pattern_stats.total()
            )?;
            for kind in EnumSet::<MotifKind>::all() {
                let count = c.pattern_stats.count(kind);
                if count > 0 {
                    write!(out, " {kind}={count}")?;
                }
            }
            writeln!(out)?;
        }
        Ok(out)
    }
}
