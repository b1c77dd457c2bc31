use std::collections::BTreeSet;

use super::{Adjacency, AssemblyGraph};
use crate::{
    error::DecompositionError,
    properties::{EdgeId, NodeId, SplitSide, Vertex},
};

impl AssemblyGraph {
    /// Check that the hierarchy and both views agree with the records.
    ///
    /// Expanding every top-level Pattern must reach each plain node and each edge exactly once,
    /// every edge's decomposed endpoints must be the ancestors of its current endpoints at the
    /// edge's own level, prior endpoints must still name vertices, and split halves must be
    /// mutual counterparts joined by one fake edge.
    #[tracing::instrument(skip_all)]
    pub fn verify(&self) -> Result<(), DecompositionError> {
        self.verify_hierarchy()?;
        self.verify_edges()?;
        self.verify_indexes()?;
        self.verify_splits()?;
        Ok(())
    }

    fn verify_hierarchy(&self) -> Result<(), DecompositionError> {
        let mut seen_nodes = BTreeSet::new();
        let mut seen_patterns = BTreeSet::new();
        let mut seen_edges = BTreeSet::new();
        let mut stack: Vec<(NodeId, Option<NodeId>)> =
            self.decomposed.nodes().map(|id| (id, None)).collect();
        for (edge, _, _) in self.decomposed.edges() {
            self.claim_edge(&mut seen_edges, edge, None)?;
        }

        while let Some((id, expected_parent)) = stack.pop() {
            let vertex = self.vertex(id).ok_or_else(|| {
                DecompositionError::invariant(format!("{id} is neither a node nor a pattern"))
            })?;
            if vertex.parent() != expected_parent {
                return Err(DecompositionError::invariant(format!(
                    "{id} records parent {:?} but is listed under {:?}",
                    vertex.parent(),
                    expected_parent
                )));
            }
            match vertex {
                Vertex::Node(_) => {
                    if !seen_nodes.insert(id) {
                        return Err(DecompositionError::invariant(format!(
                            "node {id} is reachable more than once"
                        )));
                    }
                }
                Vertex::Pattern(p) => {
                    if !seen_patterns.insert(id) {
                        return Err(DecompositionError::invariant(format!(
                            "pattern {id} is reachable more than once"
                        )));
                    }
                    for boundary in p.starts.iter().chain(p.ends.iter()) {
                        if !p.nodes.contains(boundary) {
                            return Err(DecompositionError::invariant(format!(
                                "pattern {id} names {boundary} as a boundary but does not contain it"
                            )));
                        }
                    }
                    for edge in p.edges.iter() {
                        self.claim_edge(&mut seen_edges, *edge, Some(id))?;
                    }
                    stack.extend(p.nodes.iter().map(|child| (*child, Some(id))));
                }
            }
        }

        if seen_nodes.len() != self.nodes.len() {
            let missing: Vec<_> = self
                .nodes
                .keys()
                .filter(|n| !seen_nodes.contains(*n))
                .collect();
            return Err(DecompositionError::invariant(format!(
                "nodes {missing:?} are not reachable from the top level"
            )));
        }
        if seen_patterns.len() != self.patterns.len() {
            return Err(DecompositionError::invariant(format!(
                "{} of {} patterns are not reachable from the top level",
                self.patterns.len() - seen_patterns.len(),
                self.patterns.len()
            )));
        }
        if seen_edges.len() != self.edges.len() {
            let missing: Vec<_> = self
                .edges
                .keys()
                .filter(|e| !seen_edges.contains(*e))
                .collect();
            return Err(DecompositionError::invariant(format!(
                "edges {missing:?} are not reachable from the top level"
            )));
        }
        Ok(())
    }

    fn claim_edge(
        &self,
        seen: &mut BTreeSet<EdgeId>,
        edge: EdgeId,
        level: Option<NodeId>,
    ) -> Result<(), DecompositionError> {
        let record = self.edge_ref(edge)?;
        if record.parent != level {
            return Err(DecompositionError::invariant(format!(
                "edge {edge} records parent {:?} but is listed under {level:?}",
                record.parent
            )));
        }
        if !seen.insert(edge) {
            return Err(DecompositionError::invariant(format!(
                "edge {edge} is reachable more than once"
            )));
        }
        Ok(())
    }

    fn verify_edges(&self) -> Result<(), DecompositionError> {
        for edge in self.edges.values() {
            for (side, current, decomposed, prior) in [
                ("source", edge.current.src, edge.decomposed.src, edge.prior.src),
                ("target", edge.current.tgt, edge.decomposed.tgt, edge.prior.tgt),
            ] {
                if !self.nodes.contains_key(&current) {
                    return Err(DecompositionError::invariant(format!(
                        "edge {}: current {side} {current} is not a plain node",
                        edge.id
                    )));
                }
                if let Some(prior) = prior.filter(|p| self.vertex(*p).is_none()) {
                    return Err(DecompositionError::invariant(format!(
                        "edge {}: prior {side} {prior} is no longer a vertex",
                        edge.id
                    )));
                }
                let expected = self.ancestor_at_level(current, edge.parent)?;
                if expected != Some(decomposed) {
                    return Err(DecompositionError::invariant(format!(
                        "edge {}: decomposed {side} is {decomposed} but {current} is represented \
                         by {expected:?} at level {:?}",
                        edge.id, edge.parent
                    )));
                }
            }
        }
        Ok(())
    }

    fn verify_indexes(&self) -> Result<(), DecompositionError> {
        let mut full = Adjacency::new();
        for id in self.nodes.keys() {
            full.add_node(*id);
        }
        let mut decomposed = Adjacency::new();
        for id in self.nodes.keys().chain(self.patterns.keys()) {
            if self.parent_of(*id)?.is_none() {
                decomposed.add_node(*id);
            }
        }
        for edge in self.edges.values() {
            full.add_edge(edge.id, edge.current.src, edge.current.tgt);
            if edge.parent.is_none() {
                decomposed.add_edge(edge.id, edge.decomposed.src, edge.decomposed.tgt);
            }
        }
        if full != self.full {
            return Err(DecompositionError::invariant(
                "full view index disagrees with the edge records",
            ));
        }
        if decomposed != self.decomposed {
            return Err(DecompositionError::invariant(
                "decomposed view index disagrees with the edge records",
            ));
        }
        Ok(())
    }

    fn verify_splits(&self) -> Result<(), DecompositionError> {
        for node in self.nodes.values() {
            let Some(split) = node.split else {
                continue;
            };
            let other = self.node_ref(split.counterpart)?;
            let mutual = other.split.map(|s| (s.counterpart, s.side));
            if mutual.map(|(c, _)| c) != Some(node.id)
                || mutual.map(|(_, side)| side) == Some(split.side)
            {
                return Err(DecompositionError::invariant(format!(
                    "split nodes {} and {} are not mutual counterparts",
                    node.id, other.id
                )));
            }
            if node.parent.is_none() && other.parent.is_none() {
                return Err(DecompositionError::invariant(format!(
                    "split node {} and its counterpart {} both lack a parent",
                    node.id, other.id
                )));
            }
            if split.side == SplitSide::Left {
                let fakes = self
                    .full
                    .edges_between(node.id, other.id)
                    .filter(|e| self.edges.get(e).is_some_and(|r| r.fake))
                    .count();
                if fakes != 1 {
                    return Err(DecompositionError::invariant(format!(
                        "split nodes {} and {} are joined by {fakes} fake edges",
                        node.id, other.id
                    )));
                }
            }
        }
        for edge in self.edges.values().filter(|e| e.fake) {
            let src = self.node_ref(edge.current.src)?;
            if src.counterpart() != Some(edge.current.tgt) {
                return Err(DecompositionError::invariant(format!(
                    "fake edge {} does not join two halves of a split node",
                    edge.id
                )));
            }
        }
        Ok(())
    }
}
