//! Core types for the undirected graph.
//!
//! Defines the vertex identifier, the canonical edge form used for
//! comparison and persistence, and summary statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex identifier. Non-negative integers in this domain.
pub type Vertex = u32;

/// An undirected edge in canonical form: smaller endpoint first.
///
/// Serializes as a two-element array `[u, v]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(Vertex, Vertex)", into = "(Vertex, Vertex)")]
pub struct Edge {
    u: Vertex,
    v: Vertex,
}

impl Edge {
    /// Build an edge from two endpoints in any order.
    pub fn new(a: Vertex, b: Vertex) -> Self {
        if a <= b {
            Self { u: a, v: b }
        } else {
            Self { u: b, v: a }
        }
    }

    /// The smaller endpoint.
    pub fn low(&self) -> Vertex {
        self.u
    }

    /// The larger endpoint.
    pub fn high(&self) -> Vertex {
        self.v
    }

    pub fn endpoints(&self) -> (Vertex, Vertex) {
        (self.u, self.v)
    }
}

impl From<(Vertex, Vertex)> for Edge {
    fn from((a, b): (Vertex, Vertex)) -> Self {
        Edge::new(a, b)
    }
}

impl From<Edge> for (Vertex, Vertex) {
    fn from(edge: Edge) -> Self {
        edge.endpoints()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.u, self.v)
    }
}

/// Statistics about the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub isolated_count: usize,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} edges ({} isolated)",
            self.vertex_count, self.edge_count, self.isolated_count
        )
    }
}
