//! Snapshot persistence.
//!
//! The snapshot is the only durable artifact. Its JSON layout:
//!
//! ```text
//! {
//!   "graph": { "vertices": [v...], "edges": [[u, v]...] },
//!   "dfs_state": {
//!     "disc":   { "<v>": int },
//!     "low":    { "<v>": int },
//!     "parent": { "<v>": int | null }
//!   }
//! }
//! ```
//!
//! Vertices are ascending, edges are canonical (`u < v`) and ascending,
//! state maps are keyed by vertex text in ascending vertex order, so the
//! same graph and state always produce the same bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::dfs::DfsState;
use crate::error::Result;
use crate::graph::{Edge, UndirectedGraph, Vertex};

/// The graph half of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
}

/// A persisted graph plus the DFS state computed for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub graph: GraphRecord,
    pub dfs_state: DfsState,
}

impl Snapshot {
    /// Capture `graph` and `state` in canonical form.
    pub fn capture(graph: &UndirectedGraph, state: &DfsState) -> Self {
        Self {
            graph: GraphRecord {
                vertices: graph.sorted_vertices(),
                edges: graph.edges(),
            },
            dfs_state: state.clone(),
        }
    }

    /// The persisted edge set.
    pub fn edge_set(&self) -> BTreeSet<Edge> {
        self.graph.edges.iter().copied().collect()
    }

    /// Rebuild the persisted graph.
    pub fn to_graph(&self) -> UndirectedGraph {
        UndirectedGraph::from_parts(
            self.graph.vertices.iter().copied(),
            self.graph.edges.iter().copied(),
        )
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let mut text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        text.push('\n');
        Ok(text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut snapshot: Snapshot = serde_json::from_str(text)?;
        // Edges deserialize canonical already; restore ordering and drop repeats.
        snapshot.graph.edges.sort_unstable();
        snapshot.graph.edges.dedup();
        snapshot.graph.vertices.sort_unstable();
        snapshot.graph.vertices.dedup();
        Ok(snapshot)
    }
}

/// Serialize the graph and DFS state to `path`, creating parent directories.
pub fn save(
    path: &Path,
    graph: &UndirectedGraph,
    state: &DfsState,
    pretty: bool,
) -> Result<Snapshot> {
    let snapshot = Snapshot::capture(graph, state);
    write_snapshot(path, &snapshot, pretty)?;
    Ok(snapshot)
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, snapshot.to_json(pretty)?)?;
    debug!(
        path = %path.display(),
        vertices = snapshot.graph.vertices.len(),
        edges = snapshot.graph.edges.len(),
        "snapshot saved"
    );
    Ok(())
}

/// Load the snapshot at `path`. A missing file is `Ok(None)`, not an error.
pub fn load(path: &Path) -> Result<Option<Snapshot>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot = Snapshot::from_json(&text)?;
    debug!(
        path = %path.display(),
        vertices = snapshot.graph.vertices.len(),
        edges = snapshot.graph.edges.len(),
        "snapshot loaded"
    );
    Ok(Some(snapshot))
}
