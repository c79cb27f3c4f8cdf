//! Graph module: the undirected graph store and its text-format reader.

pub mod builder;
pub mod engine;
pub mod types;

pub use builder::{parse_graph, read_graph};
pub use engine::UndirectedGraph;
pub use types::{Edge, GraphStats, Vertex};
