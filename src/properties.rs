pub use enumset::EnumSet;
/// [crate::properties] contains the entity model shared by every stage of a decomposition run:
/// identifiers, plain nodes, edges with their three endpoint pairs, and motif [Pattern]s.
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::DecompositionError;

/// Identity of a plain node or a [Pattern]. Both live in one id space so that a Pattern can stand
/// in for its members wherever a node id is expected.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl Display for EdgeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<u64> for EdgeId {
    fn from(id: u64) -> Self {
        EdgeId(id)
    }
}

/// Free-form biological annotations (length, coverage, ...) carried through untouched.
pub type Attributes = BTreeMap<String, serde_json::Value>;

pub const LENGTH_ATTRIBUTE: &str = "length";
pub const ORIENTATION_ATTRIBUTE: &str = "orientation";

/// The recurring shapes the decomposition engine recognizes.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum MotifKind {
    Bulge,
    Chain,
    CyclicChain,
    Bubble,
    FrayedRope,
    Bipartite,
}

impl MotifKind {
    /// Motifs with exactly one designated start and one designated end member.
    pub fn has_single_boundary(&self) -> bool {
        !self.is_top_level_only()
    }

    /// Motifs that are only searched for once the nested decomposition has converged, and which
    /// never contain other Patterns.
    pub fn is_top_level_only(&self) -> bool {
        matches!(self, MotifKind::FrayedRope | MotifKind::Bipartite)
    }

    pub fn is_chain_like(&self) -> bool {
        matches!(self, MotifKind::Chain | MotifKind::CyclicChain)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MotifKind::Bulge => "bulge",
            MotifKind::Chain => "chain",
            MotifKind::CyclicChain => "cyclic_chain",
            MotifKind::Bubble => "bubble",
            MotifKind::FrayedRope => "frayed_rope",
            MotifKind::Bipartite => "bipartite",
        }
    }
}

impl Display for MotifKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Orientation::Forward),
            "-" => Ok(Orientation::Reverse),
            other => Err(other.to_string()),
        }
    }
}

/// Which half of a split boundary node this is. The left half always sits upstream of the fake
/// edge, the right half downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitSide {
    Left,
    Right,
}

impl SplitSide {
    pub fn suffix(&self) -> &'static str {
        match self {
            SplitSide::Left => "-L",
            SplitSide::Right => "-R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Split {
    pub side: SplitSide,
    pub counterpart: NodeId,
}

/// A plain (non-motif) node of the assembly graph, or one half of a split node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// The id this node was ingested under. Split halves share it with their counterpart.
    pub base_id: NodeId,
    pub name: String,
    pub orientation: Option<Orientation>,
    pub split: Option<Split>,
    pub parent: Option<NodeId>,
    pub attributes: Attributes,
}

impl Node {
    pub fn new(
        id: NodeId,
        name: String,
        attributes: Attributes,
    ) -> Result<Self, DecompositionError> {
        let orientation = match attributes.get(ORIENTATION_ATTRIBUTE) {
            None => None,
            Some(serde_json::Value::String(s)) => Some(s.parse::<Orientation>().map_err(
                |value| DecompositionError::InvalidOrientation { node: id.0, value },
            )?),
            Some(other) => {
                return Err(DecompositionError::InvalidOrientation {
                    node: id.0,
                    value: other.to_string(),
                })
            }
        };
        Ok(Node {
            id,
            base_id: id,
            name,
            orientation,
            split: None,
            parent: None,
            attributes,
        })
    }

    pub fn is_split(&self) -> bool {
        self.split.is_some()
    }

    pub fn split_side(&self) -> Option<SplitSide> {
        self.split.map(|s| s.side)
    }

    pub fn counterpart(&self) -> Option<NodeId> {
        self.split.map(|s| s.counterpart)
    }

    /// Name shown to consumers; split halves carry a side suffix.
    pub fn display_name(&self) -> String {
        match self.split {
            Some(split) => format!("{}{}", self.name, split.side.suffix()),
            None => self.name.clone(),
        }
    }

    /// Turn this node into one half of a split and return the other half, which takes `new_id`
    /// and the opposite side. Attributes and orientation are shared by both halves.
    pub(crate) fn split_off(&mut self, new_id: NodeId, new_side: SplitSide) -> Node {
        let own_side = match new_side {
            SplitSide::Left => SplitSide::Right,
            SplitSide::Right => SplitSide::Left,
        };
        self.split = Some(Split {
            side: own_side,
            counterpart: new_id,
        });
        Node {
            id: new_id,
            base_id: self.base_id,
            name: self.name.clone(),
            orientation: self.orientation,
            split: Some(Split {
                side: new_side,
                counterpart: self.id,
            }),
            parent: None,
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoints {
    pub src: NodeId,
    pub tgt: NodeId,
}

impl Endpoints {
    pub fn new(src: NodeId, tgt: NodeId) -> Self {
        Endpoints { src, tgt }
    }
}

impl From<(u64, u64)> for Endpoints {
    fn from((src, tgt): (u64, u64)) -> Self {
        Endpoints::new(NodeId(src), NodeId(tgt))
    }
}

/// The decomposed endpoint values an edge held immediately before its most recent reroute, one
/// slot per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorEndpoints {
    pub src: Option<NodeId>,
    pub tgt: Option<NodeId>,
}

impl PriorEndpoints {
    /// Point either slot naming `old` at `new`.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) {
        for slot in [&mut self.src, &mut self.tgt] {
            if *slot == Some(old) {
                *slot = Some(new);
            }
        }
    }
}

/// A directed edge. Parallel edges are distinct records.
///
/// - `original` never changes and always refers to plain nodes.
/// - `current` follows splits: it is where the edge attaches in the full graph.
/// - `decomposed` is where the edge attaches at its own level of the hierarchy, i.e. inside
///   its parent Pattern (or at the top level when `parent` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub original: Endpoints,
    pub current: Endpoints,
    pub decomposed: Endpoints,
    pub prior: PriorEndpoints,
    pub fake: bool,
    pub parent: Option<NodeId>,
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(id: EdgeId, endpoints: Endpoints, attributes: Attributes) -> Self {
        Edge {
            id,
            original: endpoints,
            current: endpoints,
            decomposed: endpoints,
            prior: PriorEndpoints::default(),
            fake: false,
            parent: None,
            attributes,
        }
    }

    /// The synthetic connector between the two halves of a split node.
    pub fn new_fake(id: EdgeId, left: NodeId, right: NodeId) -> Self {
        Edge {
            fake: true,
            ..Edge::new(id, Endpoints::new(left, right), Attributes::new())
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.current.src == self.current.tgt
    }

    pub(crate) fn reroute_decomposed_src(&mut self, src: NodeId) {
        if self.decomposed.src != src {
            self.prior.src = Some(self.decomposed.src);
            self.decomposed.src = src;
        }
    }

    pub(crate) fn reroute_decomposed_tgt(&mut self, tgt: NodeId) {
        if self.decomposed.tgt != tgt {
            self.prior.tgt = Some(self.decomposed.tgt);
            self.decomposed.tgt = tgt;
        }
    }
}

/// A collapsed motif. Patterns are vertices of the decomposed graph in their own right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: NodeId,
    pub kind: MotifKind,
    /// Immediate children: plain nodes and nested Patterns.
    pub nodes: BTreeSet<NodeId>,
    /// Edges whose decomposed endpoints are both immediate children.
    pub edges: BTreeSet<EdgeId>,
    pub starts: Vec<NodeId>,
    pub ends: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Pattern {
    pub fn start(&self) -> Option<NodeId> {
        match (self.kind.has_single_boundary(), self.starts.as_slice()) {
            (true, [only]) => Some(*only),
            _ => None,
        }
    }

    pub fn end(&self) -> Option<NodeId> {
        match (self.kind.has_single_boundary(), self.ends.as_slice()) {
            (true, [only]) => Some(*only),
            _ => None,
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }
}

/// Anything that can sit at a vertex of the decomposed graph. Consumers branch on the tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Vertex<'a> {
    Node(&'a Node),
    Pattern(&'a Pattern),
}

impl Vertex<'_> {
    pub fn id(&self) -> NodeId {
        match self {
            Vertex::Node(n) => n.id,
            Vertex::Pattern(p) => p.id,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Vertex::Node(n) => n.parent,
            Vertex::Pattern(p) => p.parent,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Vertex::Pattern(_))
    }
}
