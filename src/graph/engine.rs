//! The graph store for cutvertex.
//!
//! Uses petgraph's `UnGraphMap` keyed directly by vertex id, so adding
//! a vertex or an edge twice is a no-op and adjacency is symmetric by
//! construction.

use petgraph::graphmap::{Neighbors, UnGraphMap};
use petgraph::Undirected;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

use super::types::{Edge, GraphStats, Vertex};

/// An undirected simple graph: no self-loops, no parallel edges.
///
/// The store is the sole owner of adjacency data. Every other component
/// reads it through `&UndirectedGraph`.
#[derive(Debug, Clone, Default)]
pub struct UndirectedGraph {
    graph: UnGraphMap<Vertex, ()>,
}

impl UndirectedGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: UnGraphMap::new(),
        }
    }

    /// Build a graph from a vertex list and an edge list.
    pub fn from_parts(
        vertices: impl IntoIterator<Item = Vertex>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut graph = Self::new();
        for v in vertices {
            graph.add_vertex(v);
        }
        for edge in edges {
            let (u, v) = edge.endpoints();
            graph.add_edge(u, v);
        }
        graph
    }

    /// Build a graph from `(u, v)` pairs.
    pub fn from_edges(edges: impl IntoIterator<Item = (Vertex, Vertex)>) -> Self {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    // ─── Mutation ───────────────────────────────────────────────

    /// Add a vertex. Idempotent.
    pub fn add_vertex(&mut self, v: Vertex) {
        self.graph.add_node(v);
    }

    /// Add an undirected edge, creating both endpoints if needed.
    /// Idempotent. A self-loop only creates the vertex.
    pub fn add_edge(&mut self, u: Vertex, v: Vertex) {
        if u == v {
            warn!(vertex = u, "ignoring self-loop");
            self.add_vertex(u);
            return;
        }
        self.graph.add_edge(u, v, ());
    }

    /// Remove an undirected edge. No-op if absent.
    pub fn remove_edge(&mut self, u: Vertex, v: Vertex) {
        self.graph.remove_edge(u, v);
    }

    // ─── Queries ────────────────────────────────────────────────

    /// All known vertices, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.graph.nodes()
    }

    /// All known vertices, ascending.
    pub fn sorted_vertices(&self) -> Vec<Vertex> {
        let mut vertices: Vec<Vertex> = self.graph.nodes().collect();
        vertices.sort_unstable();
        vertices
    }

    /// Neighbors of `v`. Empty for an unknown vertex.
    pub fn neighbors(&self, v: Vertex) -> Neighbors<'_, Vertex, Undirected> {
        self.graph.neighbors(v)
    }

    pub fn degree(&self, v: Vertex) -> usize {
        self.graph.neighbors(v).count()
    }

    pub fn contains_vertex(&self, v: Vertex) -> bool {
        self.graph.contains_node(v)
    }

    pub fn contains_edge(&self, u: Vertex, v: Vertex) -> bool {
        self.graph.contains_edge(u, v)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The underlying petgraph map, for read-only algorithms and export.
    pub fn as_graphmap(&self) -> &UnGraphMap<Vertex, ()> {
        &self.graph
    }

    /// Canonical edge list: each edge once, smaller endpoint first, sorted ascending.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .all_edges()
            .map(|(u, v, _)| Edge::new(u, v))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// The edge set, for comparing two graph versions.
    pub fn edge_set(&self) -> BTreeSet<Edge> {
        self.graph
            .all_edges()
            .map(|(u, v, _)| Edge::new(u, v))
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            isolated_count: self.vertices().filter(|&v| self.degree(v) == 0).count(),
        }
    }
}

impl fmt::Display for UndirectedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in self.sorted_vertices() {
            let mut neighbors: Vec<Vertex> = self.neighbors(v).collect();
            neighbors.sort_unstable();
            writeln!(f, "{}: {:?}", v, neighbors)?;
        }
        Ok(())
    }
}
