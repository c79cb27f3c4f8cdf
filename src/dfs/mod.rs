//! DFS module: the persisted DFS state, the explicit-stack traversal and
//! the full articulation-point detector built on it.

pub mod detector;
pub mod state;
pub(crate) mod traversal;

pub use detector::{compute_dfs_state, detect, detect_with_roots, find_articulation_points, Detection};
pub use state::DfsState;
