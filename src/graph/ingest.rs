use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{views::weakly_connected_components, AssemblyGraph};
use crate::{
    config::DecomposeConfig,
    error::DecompositionError,
    properties::{Attributes, Edge, EdgeId, Endpoints, Node, NodeId, LENGTH_ATTRIBUTE},
};

/// Attribute names the decomposition itself reports on; input may not use them.
pub static RESERVED_ATTRIBUTES: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "id",
        "name",
        "parent",
        "split",
        "counterpart",
        "fake",
        "component",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: u64,
    pub source: u64,
    pub target: u64,
    #[serde(default)]
    pub attributes: Attributes,
}

/// A directed multigraph as handed over by a parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphInput {
    /// Unit-length nodes for every id mentioned in `edges`, edges numbered in order.
    pub fn from_edge_list(edges: &[(u64, u64)]) -> Self {
        let ids: BTreeSet<u64> = edges.iter().flat_map(|(s, t)| [*s, *t]).collect();
        let nodes = ids
            .into_iter()
            .map(|id| NodeRecord {
                id,
                name: None,
                attributes: Attributes::from([(LENGTH_ATTRIBUTE.to_string(), 1.into())]),
            })
            .collect();
        let edges = edges
            .iter()
            .enumerate()
            .map(|(i, (source, target))| EdgeRecord {
                id: i as u64,
                source: *source,
                target: *target,
                attributes: Attributes::new(),
            })
            .collect();
        GraphInput { nodes, edges }
    }

    pub fn from_json_str(text: &str) -> Result<Self, DecompositionError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn check_reserved(entity: &str, attributes: &Attributes) -> Result<(), DecompositionError> {
    match attributes
        .keys()
        .find(|k| RESERVED_ATTRIBUTES.contains(k.as_str()))
    {
        Some(key) => Err(DecompositionError::ReservedAttribute {
            entity: entity.to_string(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

fn check_length(node: u64, attributes: &Attributes) -> Result<(), DecompositionError> {
    let value = attributes
        .get(LENGTH_ATTRIBUTE)
        .ok_or(DecompositionError::MissingLength { node })?;
    match value.as_f64() {
        Some(len) if len >= 0.0 => Ok(()),
        _ => Err(DecompositionError::InvalidAttribute {
            entity: format!("node {node}"),
            key: LENGTH_ATTRIBUTE.to_string(),
            reason: format!("expected a non-negative number, found {value}"),
        }),
    }
}

impl AssemblyGraph {
    /// Validate `input` and build both views. Components larger than the configured limits are
    /// dropped here, before any decomposition.
    #[tracing::instrument(skip_all)]
    pub fn from_input(
        input: GraphInput,
        config: &DecomposeConfig,
    ) -> Result<Self, DecompositionError> {
        let mut graph = AssemblyGraph::default();

        for record in input.nodes {
            let entity = format!("node {}", record.id);
            check_reserved(&entity, &record.attributes)?;
            check_length(record.id, &record.attributes)?;
            let id = NodeId(record.id);
            if graph.nodes.contains_key(&id) {
                return Err(DecompositionError::DuplicateNode { node: record.id });
            }
            let name = record.name.unwrap_or_else(|| record.id.to_string());
            graph.nodes.insert(id, Node::new(id, name, record.attributes)?);
            graph.full.add_node(id);
        }

        for record in input.edges {
            check_reserved(&format!("edge {}", record.id), &record.attributes)?;
            let id = EdgeId(record.id);
            if graph.edges.contains_key(&id) {
                return Err(DecompositionError::DuplicateEdge { edge: record.id });
            }
            for endpoint in [record.source, record.target] {
                if !graph.nodes.contains_key(&NodeId(endpoint)) {
                    return Err(DecompositionError::UnknownEndpoint {
                        edge: record.id,
                        node: endpoint,
                    });
                }
            }
            let endpoints = Endpoints::from((record.source, record.target));
            graph.full.add_edge(id, endpoints.src, endpoints.tgt);
            graph
                .edges
                .insert(id, Edge::new(id, endpoints, record.attributes));
        }

        graph.remove_too_large_components(config.max_node_count, config.max_edge_count)?;

        graph.decomposed = graph.full.clone();
        graph.next_node_id = graph.nodes.keys().next_back().map_or(0, |id| id.0 + 1);
        graph.next_edge_id = graph.edges.keys().next_back().map_or(0, |id| id.0 + 1);
        tracing::debug!(
            "Ingested {} nodes and {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    fn remove_too_large_components(
        &mut self,
        max_nodes: usize,
        max_edges: usize,
    ) -> Result<(), DecompositionError> {
        let components = weakly_connected_components(&self.full);
        let total = components.len();
        let mut dropped = 0;
        for component in components {
            let edge_count: usize = component.iter().map(|n| self.full.out_degree(*n)).sum();
            if component.len() <= max_nodes && edge_count <= max_edges {
                continue;
            }
            tracing::warn!(
                "Ignoring a component with {} nodes and {} edges (limits: {} / {})",
                component.len(),
                edge_count,
                max_nodes,
                max_edges
            );
            dropped += 1;
            for node in component {
                for (edge, _, _) in self.full.remove_node(node) {
                    self.edges.remove(&edge);
                }
                self.nodes.remove(&node);
            }
        }
        if total > 0 && dropped == total {
            return Err(DecompositionError::AllComponentsTooLarge {
                max_nodes,
                max_edges,
            });
        }
        Ok(())
    }
}
