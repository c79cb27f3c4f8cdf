//! Graphviz rendering of a run.
//!
//! Articulation points are filled red, vertices recomputed this run gold,
//! everything else light blue. Render with `dot -Tpng graph.dot`.

use petgraph::dot::{Config, Dot};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::graph::{UndirectedGraph, Vertex};

const ARTICULATION_COLOR: &str = "red";
const RECOMPUTED_COLOR: &str = "gold";
const DEFAULT_COLOR: &str = "lightblue";

/// DOT text for `graph` with `articulation_points` and `recomputed` highlighted.
///
/// An articulation point that was also recomputed is drawn as an
/// articulation point.
pub fn to_dot(
    graph: &UndirectedGraph,
    articulation_points: &BTreeSet<Vertex>,
    recomputed: &[Vertex],
) -> String {
    let recomputed: BTreeSet<Vertex> = recomputed.iter().copied().collect();
    let color_of = |v: Vertex| {
        if articulation_points.contains(&v) {
            ARTICULATION_COLOR
        } else if recomputed.contains(&v) {
            RECOMPUTED_COLOR
        } else {
            DEFAULT_COLOR
        }
    };
    format!(
        "{:?}",
        Dot::with_attr_getters(
            graph.as_graphmap(),
            &[Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (v, _)| format!("style=filled fillcolor={} ", color_of(v)),
        )
    )
}

/// Write the DOT rendering to `path`.
pub fn write_dot(
    path: &Path,
    graph: &UndirectedGraph,
    articulation_points: &BTreeSet<Vertex>,
    recomputed: &[Vertex],
) -> Result<()> {
    fs::write(path, to_dot(graph, articulation_points, recomputed))?;
    Ok(())
}
