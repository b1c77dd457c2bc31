use std::collections::BTreeSet;

use crate::{
    error::DecompositionError,
    graph::AssemblyGraph,
    properties::{EdgeId, MotifKind, NodeId, Pattern, SplitSide},
    validators::Motif,
};

/// What a collapse changed at the top level, beyond the motif members disappearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Collapsed {
    pub pattern: NodeId,
    /// Split halves created outside the new Pattern, left halves first.
    pub outside_halves: Vec<NodeId>,
    /// Chain Patterns flattened into the new one and deleted.
    pub absorbed: Vec<NodeId>,
}

impl AssemblyGraph {
    /// Replace the members of `motif` in the decomposed graph with a single new Pattern.
    ///
    /// Boundary members that are plain, unsplit nodes with outside neighbours are split first,
    /// so that only fake edges cross into the Pattern through a split boundary. Every top-level
    /// edge touching the motif then either moves inside the Pattern or is rerouted to it.
    pub(crate) fn collapse(&mut self, motif: &Motif) -> Result<Collapsed, DecompositionError> {
        let members: BTreeSet<NodeId> = motif.nodes.iter().copied().collect();
        for m in members.iter() {
            if !self.decomposed.contains(*m) {
                return Err(DecompositionError::invariant(format!(
                    "{} member {m} is not a top-level vertex",
                    motif.kind
                )));
            }
        }

        let pid = self.alloc_node_id();
        let mut collapsed = Collapsed {
            pattern: pid,
            ..Default::default()
        };
        for s in motif.starts.iter() {
            if self.needs_split(*s, &members, SplitSide::Left) {
                collapsed.outside_halves.push(self.split_start(*s, &members)?);
            }
        }
        for e in motif.ends.iter() {
            if self.needs_split(*e, &members, SplitSide::Right) {
                collapsed.outside_halves.push(self.split_end(*e, &members)?);
            }
        }

        let touching: BTreeSet<EdgeId> = members
            .iter()
            .flat_map(|m| self.decomposed.incident_edges(*m))
            .collect();
        let mut internal = BTreeSet::new();
        let mut crossing = Vec::new();
        for edge in touching {
            let dec = self.edge_ref(edge)?.decomposed;
            match (members.contains(&dec.src), members.contains(&dec.tgt)) {
                (true, true) => {
                    internal.insert(edge);
                }
                (false, true) => crossing.push((edge, dec.src, pid)),
                (true, false) => crossing.push((edge, pid, dec.tgt)),
                (false, false) => {
                    return Err(DecompositionError::invariant(format!(
                        "edge {edge} was indexed at a member of {pid} but joins {} → {}",
                        dec.src, dec.tgt
                    )))
                }
            }
        }

        for m in members.iter() {
            self.decomposed.remove_node(*m);
        }
        self.decomposed.add_node(pid);
        for (edge, src, tgt) in crossing.iter() {
            let record = self.edge_mut(*edge)?;
            record.reroute_decomposed_src(*src);
            record.reroute_decomposed_tgt(*tgt);
            self.decomposed.add_edge(*edge, *src, *tgt);
        }
        for edge in internal.iter() {
            self.edge_mut(*edge)?.parent = Some(pid);
        }
        for m in members.iter() {
            self.set_parent(*m, Some(pid))?;
        }
        self.patterns.insert(
            pid,
            Pattern {
                id: pid,
                kind: motif.kind,
                nodes: members,
                edges: internal,
                starts: motif.starts.clone(),
                ends: motif.ends.clone(),
                parent: None,
            },
        );
        tracing::debug!(
            "[collapse] {} {pid}: {:?}, {} crossing edges, {} new split halves",
            motif.kind,
            motif.nodes.iter().map(|n| n.0).collect::<Vec<_>>(),
            crossing.len(),
            collapsed.outside_halves.len(),
        );

        if motif.kind.is_chain_like() {
            collapsed.absorbed = self.absorb_child_chains(pid)?;
        }
        Ok(collapsed)
    }

    /// Flatten every child Chain of `pid` into `pid` itself, returning the absorbed ids.
    fn absorb_child_chains(&mut self, pid: NodeId) -> Result<Vec<NodeId>, DecompositionError> {
        let chains: Vec<NodeId> = self
            .pattern_ref(pid)?
            .nodes
            .iter()
            .filter(|c| {
                self.patterns
                    .get(c)
                    .is_some_and(|p| p.kind == MotifKind::Chain)
            })
            .copied()
            .collect();
        for q in chains.iter() {
            self.absorb_chain(pid, *q)?;
        }
        Ok(chains)
    }

    /// Move the members and edges of chain `q` up into its parent `p` and delete `q`.
    ///
    /// Edges of `p` that were attached to `q` itself go back to the member of `q` they were
    /// attached to before `q` was collapsed. No edge keeps `q` as its prior endpoint afterwards.
    fn absorb_chain(&mut self, p: NodeId, q: NodeId) -> Result<(), DecompositionError> {
        let level_edges: Vec<EdgeId> = self.pattern_ref(p)?.edges.iter().copied().collect();
        for edge in level_edges.iter().copied() {
            let (dec, current, prior) = {
                let e = self.edge_ref(edge)?;
                (e.decomposed, e.current, e.prior)
            };
            if dec.src == q {
                let inner = self.restore_endpoint(edge, q, prior.src, current.src)?;
                self.edge_mut(edge)?.reroute_decomposed_src(inner);
            }
            if dec.tgt == q {
                let inner = self.restore_endpoint(edge, q, prior.tgt, current.tgt)?;
                self.edge_mut(edge)?.reroute_decomposed_tgt(inner);
            }
        }
        let crossing = self.decomposed.incident_edges(p);
        for edge in level_edges.into_iter().chain(crossing) {
            self.repoint_prior(edge, q)?;
        }

        let absorbed = self.patterns.remove(&q).ok_or_else(|| {
            DecompositionError::invariant(format!("chain {q} vanished before joining {p}"))
        })?;
        for child in absorbed.nodes.iter() {
            self.set_parent(*child, Some(p))?;
        }
        for edge in absorbed.edges.iter() {
            self.edge_mut(*edge)?.parent = Some(p);
        }
        let (q_start, q_end) = (absorbed.start(), absorbed.end());
        let parent = self.pattern_mut(p)?;
        parent.nodes.remove(&q);
        parent.nodes.extend(absorbed.nodes.iter().copied());
        parent.edges.extend(absorbed.edges.iter().copied());
        replace_boundary(&mut parent.starts, q, q_start);
        replace_boundary(&mut parent.ends, q, q_end);
        tracing::debug!(
            "[collapse] chain {q} flattened into {} {p} ({} members, {} edges)",
            parent.kind,
            absorbed.nodes.len(),
            absorbed.edges.len()
        );
        Ok(())
    }

    /// Rewrite a prior endpoint naming `q` to the member of `q` that holds the edge's current
    /// endpoint on that side. Must run while `q`'s members still record `q` as their parent.
    fn repoint_prior(&mut self, edge: EdgeId, q: NodeId) -> Result<(), DecompositionError> {
        let (current, prior) = {
            let e = self.edge_ref(edge)?;
            (e.current, e.prior)
        };
        let mut repointed = prior;
        for (slot, held) in [
            (&mut repointed.src, current.src),
            (&mut repointed.tgt, current.tgt),
        ] {
            if *slot != Some(q) {
                continue;
            }
            let member = self.ancestor_at_level(held, Some(q))?;
            if member.is_none() {
                return Err(DecompositionError::invariant(format!(
                    "edge {edge}: prior endpoint is chain {q}, but {held} is outside it"
                )));
            }
            *slot = member;
        }
        self.edge_mut(edge)?.prior = repointed;
        Ok(())
    }

    /// The member of chain `q` an edge attached to before `q` was collapsed. The remembered
    /// prior endpoint and the hierarchy must agree.
    fn restore_endpoint(
        &self,
        edge: EdgeId,
        q: NodeId,
        prior: Option<NodeId>,
        current: NodeId,
    ) -> Result<NodeId, DecompositionError> {
        let walked = self.ancestor_at_level(current, Some(q))?;
        match (prior, walked) {
            (Some(prior), Some(walked)) if prior == walked => Ok(prior),
            _ => Err(DecompositionError::invariant(format!(
                "edge {edge}: prior endpoint {prior:?} disagrees with the member of chain {q} \
                 holding {current} ({walked:?})"
            ))),
        }
    }
}

fn replace_boundary(boundary: &mut [NodeId], old: NodeId, new: Option<NodeId>) {
    if let Some(new) = new {
        for b in boundary.iter_mut().filter(|b| **b == old) {
            *b = new;
        }
    }
}
