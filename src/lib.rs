//! # motifscope-core
//!
//! Hierarchical decomposition of genome assembly graphs into nested recurring motifs.
//!
//! ## Overview
//!
//! An assembly graph is a directed multigraph whose nodes are contigs and whose edges are the
//! overlaps between them. Read at full resolution it is a hairball. motifscope-core groups
//! recurring shapes (bulges, chains, cyclic chains, bubbles, frayed ropes and bipartite regions)
//! into **Patterns**: composite nodes that stand in for their members. Patterns nest, so a
//! bubble can sit inside a chain that sits inside another bubble.
//!
//! Two views of the graph are kept in sync throughout:
//!
//! - the **full** graph: every node and edge, with boundary nodes that belong to two motifs
//!   split into left/right halves joined by a *fake* edge;
//! - the **decomposed** graph: only top-level nodes and Patterns, with interiors hidden.
//!
//! Recursively expanding every Pattern in the decomposed graph reproduces the full graph
//! exactly. [`graph::AssemblyGraph::verify`] checks this.
//!
//! ### Key Features
//!
//! - **Fixpoint engine**: motifs are collapsed bottom-up until nothing else validates
//! - **Boundary splitting**: a node shared by two motifs is split instead of being claimed twice
//! - **Split clean-up**: splits that turned out not to be needed are folded back afterwards
//! - **Deterministic**: candidates are visited in id order, so runs are reproducible
//! - **Component ranking**: weakly connected components, sized and numbered largest first
//!
//! ## Architecture
//!
//! - **[`properties`]**: identifiers, nodes, edges, Patterns and motif kinds
//! - **[`graph`]**: the arena of records, both adjacency views, ingestion and verification
//! - **[`validators`]**: one pure function per motif deciding whether it starts at a node
//! - **[`decompose`]**: the engine, the boundary splitter and the unnecessary-split pass
//! - **[`components`]**: component partitioning, counts and ranking
//! - **[`config`]**: [`config::DecomposeConfig`] and its TOML provider
//! - **[`error`]**: [`DecompositionError`]
//!
//! ## Quick Start
//!
//! ```rust
//! use motifscope_core::{
//!     components::Components,
//!     config::DecomposeConfig,
//!     decompose::decompose,
//!     graph::GraphInput,
//!     properties::MotifKind,
//! };
//!
//! # fn main() -> Result<(), motifscope_core::DecompositionError> {
//! // 0 → 1 → {2, 3} → 4
//! let input = GraphInput::from_edge_list(&[(0, 1), (1, 2), (1, 3), (2, 4), (3, 4)]);
//! let (graph, summary) = decompose(input, &DecomposeConfig::default())?;
//!
//! assert_eq!(summary.patterns.bubbles, 1);
//! assert_eq!(summary.split_nodes, 0);
//!
//! // A single chain holding node 0 and the bubble.
//! let top = graph.top_level();
//! let chain = graph.pattern(top[0]).expect("top-level pattern");
//! assert_eq!(chain.kind, MotifKind::Chain);
//!
//! let components = Components::record(&graph)?;
//! println!("{}", components.render_table()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The library logs through [`tracing`] and never installs a subscriber. Collapses, splits and
//! merges are logged at `debug`, run summaries at `info`, and dropped oversized input components
//! at `warn`.

pub mod components;
pub mod config;
pub mod decompose;
pub mod error;
pub mod graph;
pub mod properties;
#[cfg(test)]
mod tests;
pub mod validators;

pub use error::*;
