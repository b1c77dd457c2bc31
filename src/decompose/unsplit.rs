use crate::{
    error::DecompositionError,
    graph::AssemblyGraph,
    properties::{EdgeId, NodeId, SplitSide},
};

impl AssemblyGraph {
    /// Undo every split whose two halves ended up on the same side of the hierarchy.
    ///
    /// A split half `N` is folded back into its counterpart `C` when the vertex its fake edge
    /// reaches on `C`'s side is a sibling of `N`, or when `N` is a left half and the two halves
    /// sit in two different top-level-only motifs. Splits whose counterpart is still top-level
    /// are left to the counterpart's own turn. Returns the number of splits removed; running
    /// the pass again removes nothing.
    #[tracing::instrument(skip_all)]
    pub fn remove_unnecessary_splits(&mut self) -> Result<usize, DecompositionError> {
        let mut removed = 0;
        for n in self.split_nodes() {
            let Some(node) = self.nodes.get(&n) else {
                continue;
            };
            let Some(split) = node.split else {
                continue;
            };
            let n_parent = node.parent;
            let c = split.counterpart;
            let c_parent = self.node_ref(c)?.parent;
            match (n_parent, c_parent) {
                (None, None) => {
                    return Err(DecompositionError::invariant(format!(
                        "split node {n} and its counterpart {c} both lack a parent"
                    )))
                }
                (_, None) => continue,
                _ => {}
            }

            let fake = self.fake_edge_between(n, c)?;
            let record = self.edge_ref(fake)?;
            let beyond = if record.current.tgt == c {
                record.decomposed.tgt
            } else {
                record.decomposed.src
            };
            if self.vertex(beyond).is_none() || !self.is_ancestor_or_self(beyond, c)? {
                return Err(DecompositionError::invariant(format!(
                    "fake edge {fake} between {n} and {c} resolves to {beyond}, which does not \
                     contain {c}"
                )));
            }

            let siblings = self.parent_of(beyond)? == n_parent;
            let across_top_level_motifs = split.side == SplitSide::Left
                && n_parent != c_parent
                && self.is_top_level_only_pattern(n_parent)
                && self.is_top_level_only_pattern(c_parent);
            if siblings || across_top_level_motifs {
                self.merge_split(n, c, fake)?;
                removed += 1;
            }
        }
        tracing::info!("[unsplit] removed {removed} unnecessary splits");
        Ok(removed)
    }

    fn is_top_level_only_pattern(&self, id: Option<NodeId>) -> bool {
        id.and_then(|p| self.patterns.get(&p))
            .is_some_and(|p| p.kind.is_top_level_only())
    }

    /// The fake edge joining two split halves, in either direction.
    pub(crate) fn fake_edge_between(
        &self,
        a: NodeId,
        b: NodeId,
    ) -> Result<EdgeId, DecompositionError> {
        let mut fakes = self
            .full
            .edges_between(a, b)
            .chain(self.full.edges_between(b, a))
            .filter(|e| self.edges.get(e).is_some_and(|r| r.fake));
        match (fakes.next(), fakes.next()) {
            (Some(edge), None) => Ok(edge),
            (None, _) => Err(DecompositionError::invariant(format!(
                "split halves {a} and {b} are not joined by a fake edge"
            ))),
            (Some(_), Some(_)) => Err(DecompositionError::invariant(format!(
                "split halves {a} and {b} are joined by more than one fake edge"
            ))),
        }
    }

    /// Fold split half `n` back into its counterpart `c`, deleting `n` and the fake edge.
    fn merge_split(
        &mut self,
        n: NodeId,
        c: NodeId,
        fake: EdgeId,
    ) -> Result<(), DecompositionError> {
        let record = self.edges.remove(&fake).ok_or_else(|| {
            DecompositionError::invariant(format!("fake edge {fake} vanished"))
        })?;
        self.full
            .remove_edge(fake, record.current.src, record.current.tgt);
        match record.parent {
            None => {
                self.decomposed
                    .remove_edge(fake, record.decomposed.src, record.decomposed.tgt);
            }
            Some(p) => {
                self.pattern_mut(p)?.edges.remove(&fake);
            }
        }

        let node = self.node_ref(n)?.clone();
        match node.parent {
            None => {
                self.decomposed.remove_node(n);
            }
            Some(p) => {
                self.pattern_mut(p)?.nodes.remove(&n);
            }
        }

        let incident = self.full.incident_edges(n);
        for edge in incident.iter() {
            let current = self.edge_ref(*edge)?.current;
            let src = if current.src == n { c } else { current.src };
            let tgt = if current.tgt == n { c } else { current.tgt };
            self.reroute_current(*edge, src, tgt)?;
            self.relevel_edge(*edge)?;
        }

        for edge in self.full.incident_edges(c) {
            self.edge_mut(edge)?.prior.replace(n, c);
        }
        self.repair_boundaries(n, c)?;
        self.nodes.remove(&n);
        self.full.remove_node(n);
        self.node_mut(c)?.split = None;
        tracing::debug!(
            "[unsplit] {}{} folded into {c}, {} edges moved",
            node.name,
            node.split_side().map(|s| s.suffix()).unwrap_or_default(),
            incident.len()
        );

        if n == node.base_id {
            self.rekey(c, n)?;
        }
        Ok(())
    }

    /// Point Pattern starts/ends that named `n` at whatever now represents `c` inside that
    /// Pattern. Top-level-only motifs just lose the entry when `c` is outside them.
    fn repair_boundaries(&mut self, n: NodeId, c: NodeId) -> Result<(), DecompositionError> {
        let affected: Vec<NodeId> = self
            .patterns
            .values()
            .filter(|p| p.starts.contains(&n) || p.ends.contains(&n))
            .map(|p| p.id)
            .collect();
        for pid in affected {
            let replacement = self.ancestor_at_level(c, Some(pid))?;
            let pattern = self.pattern_mut(pid)?;
            match replacement {
                Some(r) => {
                    for b in pattern.starts.iter_mut().chain(pattern.ends.iter_mut()) {
                        if *b == n {
                            *b = r;
                        }
                    }
                }
                // The folded node now belongs to the motif on its other side, so this frayed
                // rope or bipartite region can be left with one start or one end. It stays a
                // Pattern: its remaining members were validated together and nothing nests
                // inside a top-level-only motif that could depend on the lost boundary.
                None if pattern.kind.is_top_level_only() => {
                    pattern.starts.retain(|b| *b != n);
                    pattern.ends.retain(|b| *b != n);
                }
                None => {
                    return Err(DecompositionError::invariant(format!(
                        "{} {pid} has boundary {n}, but {c} is outside it",
                        pattern.kind
                    )))
                }
            }
        }
        Ok(())
    }

    /// Give node `old` the id `new`, which must be unused.
    fn rekey(&mut self, old: NodeId, new: NodeId) -> Result<(), DecompositionError> {
        if self.vertex(new).is_some() {
            return Err(DecompositionError::invariant(format!(
                "cannot re-key {old} as {new}: the id is taken"
            )));
        }
        let mut node = self.nodes.remove(&old).ok_or_else(|| {
            DecompositionError::invariant(format!("cannot re-key unknown node {old}"))
        })?;
        node.id = new;
        let parent = node.parent;
        self.nodes.insert(new, node);
        match parent {
            None => self.decomposed.rename_node(old, new),
            Some(p) => {
                let pattern = self.pattern_mut(p)?;
                pattern.nodes.remove(&old);
                pattern.nodes.insert(new);
            }
        }
        self.full.rename_node(old, new);

        for edge in self.full.incident_edges(new) {
            let record = self.edge_mut(edge)?;
            for endpoints in [&mut record.current, &mut record.decomposed] {
                if endpoints.src == old {
                    endpoints.src = new;
                }
                if endpoints.tgt == old {
                    endpoints.tgt = new;
                }
            }
            record.prior.replace(old, new);
        }
        for pattern in self.patterns.values_mut() {
            for b in pattern.starts.iter_mut().chain(pattern.ends.iter_mut()) {
                if *b == old {
                    *b = new;
                }
            }
        }
        tracing::debug!("[unsplit] {old} re-keyed as {new}");
        Ok(())
    }
}
