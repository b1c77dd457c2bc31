use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Every failure the decomposition core can report.
///
/// Two classes matter to callers. [`DecompositionError::Invariant`] means the algorithm's own
/// bookkeeping is inconsistent; the run is aborted and the message names the offending ids.
/// The ingestion variants report an input-contract violation against the offending node or
/// edge. The remaining variants cover the config loader and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DecompositionError {
    #[error("Invariant violated: {0}")]
    Invariant(String),
    #[error("Node {node} has no length attribute")]
    MissingLength { node: u64 },
    #[error("{entity}: attribute '{key}' is invalid: {reason}")]
    InvalidAttribute {
        entity: String,
        key: String,
        reason: String,
    },
    #[error("Node id {node} is declared more than once")]
    DuplicateNode { node: u64 },
    #[error("Edge id {edge} is declared more than once")]
    DuplicateEdge { edge: u64 },
    #[error("{entity}: attribute '{key}' collides with a reserved attribute name")]
    ReservedAttribute { entity: String, key: String },
    #[error("Edge {edge} references undeclared node {node}")]
    UnknownEndpoint { edge: u64, node: u64 },
    #[error("Node {node} has unsupported orientation '{value}'; expected '+' or '-'")]
    InvalidOrientation { node: u64, value: String },
    #[error(
        "Every component exceeds the size limits ({max_nodes} nodes / {max_edges} edges); \
         nothing left to decompose"
    )]
    AllComponentsTooLarge { max_nodes: usize, max_edges: usize },
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl DecompositionError {
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        DecompositionError::Invariant(msg.into())
    }

    /// True for errors raised by the algorithm's own consistency checks, as opposed to bad
    /// input or environment failures.
    pub fn is_invariant(&self) -> bool {
        matches!(self, DecompositionError::Invariant(_))
    }

    pub fn is_input_contract(&self) -> bool {
        matches!(
            self,
            DecompositionError::MissingLength { .. }
                | DecompositionError::InvalidAttribute { .. }
                | DecompositionError::DuplicateNode { .. }
                | DecompositionError::DuplicateEdge { .. }
                | DecompositionError::ReservedAttribute { .. }
                | DecompositionError::UnknownEndpoint { .. }
                | DecompositionError::InvalidOrientation { .. }
                | DecompositionError::AllComponentsTooLarge { .. }
        )
    }
}

impl From<toml::de::Error> for DecompositionError {
    fn from(src: toml::de::Error) -> DecompositionError {
        DecompositionError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for DecompositionError {
    fn from(src: toml::ser::Error) -> DecompositionError {
        DecompositionError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for DecompositionError {
    fn from(src: JsonError) -> DecompositionError {
        DecompositionError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for DecompositionError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DecompositionError::NotFound(format!("{x}")),
            _ => DecompositionError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for DecompositionError {
    fn from(x: fmt::Error) -> Self {
        DecompositionError::Serialization(format!("{x}"))
    }
}
