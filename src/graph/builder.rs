//! Graph builder: reads the plain-text graph format.
//!
//! ```text
//! N M        header: vertex count, declared edge count
//! u v        one edge per line
//! ```
//!
//! Vertices `0..N` are created up front. The declared edge count is
//! informational only; every later non-blank line is read as an edge.
//! Lines starting with `#` are comments.
//!
//! The header count is capped at [`MAX_DECLARED_VERTICES`]: every declared
//! vertex is allocated before the first edge is read.

use std::fs;
use std::path::Path;
use tracing::debug;

use super::engine::UndirectedGraph;
use super::types::Vertex;
use crate::error::{CutVertexError, Result};

/// Largest vertex count a header may declare.
pub const MAX_DECLARED_VERTICES: Vertex = 1 << 26;

/// Read and parse a graph file.
pub fn read_graph(path: &Path) -> Result<UndirectedGraph> {
    let text = fs::read_to_string(path)?;
    let graph = parse_graph(&text)?;
    debug!(
        file = %path.display(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Parse a graph from its text form. Fails fast: no partial graph is returned.
pub fn parse_graph(text: &str) -> Result<UndirectedGraph> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (header_line, header) = lines
        .next()
        .ok_or_else(|| CutVertexError::malformed(1, "missing header line `N M`"))?;

    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() < 2 {
        return Err(CutVertexError::malformed(
            header_line,
            "header must contain two integers: vertex count and edge count",
        ));
    }
    let vertex_count: Vertex = parse_field(header_fields[0], header_line)?;
    let declared_edges: usize = parse_field(header_fields[1], header_line)?;
    if vertex_count > MAX_DECLARED_VERTICES {
        return Err(CutVertexError::malformed(
            header_line,
            format!(
                "header declares {} vertices, limit is {}",
                vertex_count, MAX_DECLARED_VERTICES
            ),
        ));
    }

    let mut graph = UndirectedGraph::new();
    for v in 0..vertex_count {
        graph.add_vertex(v);
    }

    let mut edge_lines = 0usize;
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(CutVertexError::malformed(
                line_no,
                format!("expected an edge `u v`, found {} fields", fields.len()),
            ));
        }
        let u: Vertex = parse_field(fields[0], line_no)?;
        let v: Vertex = parse_field(fields[1], line_no)?;
        graph.add_edge(u, v);
        edge_lines += 1;
    }

    if edge_lines != declared_edges {
        debug!(
            declared = declared_edges,
            found = edge_lines,
            "edge count differs from header"
        );
    }

    Ok(graph)
}

fn parse_field<T: std::str::FromStr>(field: &str, line: usize) -> Result<T> {
    field
        .parse()
        .map_err(|_| CutVertexError::malformed(line, format!("`{}` is not a non-negative integer", field)))
}
