//! # cutvertex
//!
//! Articulation points (cut vertices) of an undirected graph, maintained
//! incrementally across runs.
//!
//! A run reads the graph, loads the DFS state persisted by the previous
//! run, and either reuses it, repairs it for each added edge inside the
//! subtree of the edge's lowest common ancestor, or recomputes it from
//! scratch. The new state is saved for the next run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cutvertex::{analyze, read_graph, CutVertexConfig};
//! use std::path::Path;
//!
//! let graph = read_graph(Path::new("data/example_graph.txt"))?;
//! let config = CutVertexConfig::default();
//! let state_path = config.resolve_state_path(Path::new("data/example_graph.txt"));
//!
//! let outcome = analyze(&graph, &state_path, &config)?;
//! println!("{:?}", outcome.articulation_points);
//! # Ok::<(), cutvertex::CutVertexError>(())
//! ```

pub mod cli;
pub mod config;
pub mod dfs;
pub mod error;
pub mod graph;
pub mod reconcile;
pub mod render;
pub mod storage;
pub mod updater;

// Re-exports for convenience
pub use config::{ArticulationStrategy, CutVertexConfig};
pub use error::{CutVertexError, Result};

pub use dfs::{compute_dfs_state, detect, find_articulation_points, Detection, DfsState};
pub use graph::{parse_graph, read_graph, Edge, GraphStats, UndirectedGraph, Vertex};
pub use reconcile::{analyze, reconcile, FullReason, ReconcileMode, ReconcileOutcome};
pub use storage::{load, save, Snapshot};
pub use updater::{apply_edge_addition, find_lca, IncrementalUpdate};
