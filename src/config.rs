use crate::{
    error::DecompositionError,
    properties::{EnumSet, MotifKind},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// Size limits used when the input does not specify its own, after the desktop tool this
/// decomposition was first written for.
pub const DEFAULT_MAX_NODE_COUNT: usize = 8000;
pub const DEFAULT_MAX_EDGE_COUNT: usize = 8000;

/// Knobs for one decomposition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Detectors the engine may run. Disabling one never changes how the others behave.
    pub motifs: EnumSet<MotifKind>,
    /// Weakly connected input components with more nodes than this are dropped at ingestion.
    pub max_node_count: usize,
    /// Weakly connected input components with more edges than this are dropped at ingestion.
    pub max_edge_count: usize,
    pub remove_unnecessary_splits: bool,
    /// Run [crate::graph::AssemblyGraph::verify] once the decomposition is complete.
    pub verify: bool,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        DecomposeConfig {
            motifs: EnumSet::all(),
            max_node_count: DEFAULT_MAX_NODE_COUNT,
            max_edge_count: DEFAULT_MAX_EDGE_COUNT,
            remove_unnecessary_splits: true,
            verify: true,
        }
    }
}

impl DecomposeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, DecompositionError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, DecompositionError> {
        Ok(toml::to_string(self)?)
    }

    pub fn enabled(&self, kind: MotifKind) -> bool {
        self.motifs.contains(kind)
    }
}

pub trait ConfigProvider {
    fn get_config(&self) -> Result<DecomposeConfig, DecompositionError>;
    fn set_config(&self, config: &DecomposeConfig) -> Result<(), DecompositionError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<DecomposeConfig, DecompositionError> {
        tracing::debug!("Attempting to read decomposition config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(DecomposeConfig::default());
        }
        let content = read_to_string(&self.path)?;
        DecomposeConfig::from_toml_str(&content)
    }

    fn set_config(&self, config: &DecomposeConfig) -> Result<(), DecompositionError> {
        tracing::debug!("Attempting to write decomposition config to: {:?}", &self.path);
        write(&self.path, config.to_toml_string()?)?;
        Ok(())
    }
}
