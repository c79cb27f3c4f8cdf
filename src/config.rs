//! Configuration loaded from `cutvertex.toml`.
//!
//! ```toml
//! [state]
//! path = "state/graph.json"   # optional, default: graph path with a .json extension
//! pretty = true
//!
//! [reconcile]
//! articulation = "derived"    # or "traversal"
//! max_incremental_edges = 64
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cutvertex.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutVertexConfig {
    pub state: StateConfig,
    pub reconcile: ReconcileConfig,
}

/// Where and how the snapshot is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Snapshot path override.
    pub path: Option<PathBuf>,
    /// Indent the snapshot JSON.
    pub pretty: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: true,
        }
    }
}

/// How a run moves from the persisted state to the current graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// How the articulation-point set is obtained when the DFS state was
    /// reused or repaired incrementally.
    pub articulation: ArticulationStrategy,
    /// Above this many added edges a full recompute is cheaper than
    /// repairing once per edge.
    pub max_incremental_edges: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            articulation: ArticulationStrategy::Derived,
            max_incremental_edges: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticulationStrategy {
    /// Read the set off the reused or repaired DFS state.
    Derived,
    /// Run the full detector again on the current graph.
    Traversal,
}

impl CutVertexConfig {
    /// Load config from `path`. Missing file gives defaults; an unreadable
    /// or invalid file logs a warning and gives defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Load config from `path`, surfacing parse and I/O errors.
    pub fn try_load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Snapshot location for `graph_path`: the configured override, or the
    /// graph path with its extension replaced by `.json`.
    pub fn resolve_state_path(&self, graph_path: &Path) -> PathBuf {
        if let Some(path) = &self.state.path {
            return path.clone();
        }
        if graph_path.extension().is_some_and(|ext| ext == "json") {
            return graph_path.with_extension("state.json");
        }
        graph_path.with_extension("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CutVertexConfig::default();
        assert!(config.state.pretty);
        assert!(config.state.path.is_none());
        assert_eq!(config.reconcile.articulation, ArticulationStrategy::Derived);
        assert_eq!(config.reconcile.max_incremental_edges, 64);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CutVertexConfig::from_toml_str(
            r#"
[reconcile]
articulation = "traversal"
"#,
        )
        .unwrap();
        assert_eq!(config.reconcile.articulation, ArticulationStrategy::Traversal);
        assert_eq!(config.reconcile.max_incremental_edges, 64);
        assert!(config.state.pretty);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = CutVertexConfig::from_toml_str("[reconcile]\narticulation = \"sometimes\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CutVertexConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE));
        assert_eq!(config, CutVertexConfig::default());
    }

    #[test]
    fn test_load_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "state = 3").unwrap();
        assert!(CutVertexConfig::try_load(&path).is_err());
        assert_eq!(CutVertexConfig::load(&path), CutVertexConfig::default());
    }

    #[test]
    fn test_resolve_state_path() {
        let config = CutVertexConfig::default();
        assert_eq!(
            config.resolve_state_path(Path::new("data/example_graph.txt")),
            PathBuf::from("data/example_graph.json")
        );
        assert_eq!(
            config.resolve_state_path(Path::new("graph")),
            PathBuf::from("graph.json")
        );
        assert_eq!(
            config.resolve_state_path(Path::new("graph.json")),
            PathBuf::from("graph.state.json")
        );

        let config = CutVertexConfig::from_toml_str("[state]\npath = \"out/state.json\"\n").unwrap();
        assert_eq!(
            config.resolve_state_path(Path::new("data/g.txt")),
            PathBuf::from("out/state.json")
        );
    }
}
