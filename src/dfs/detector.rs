//! Full articulation-point detection (Tarjan low-link, single pass).
//!
//! Every vertex is offered as a root in turn, so disconnected graphs are
//! covered. The resulting set does not depend on the order vertices or
//! neighbors are visited in, though the disc/low numbering does.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::state::DfsState;
use super::traversal::{Scope, TraversalContext};
use crate::graph::{UndirectedGraph, Vertex};

/// Result of a full detection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub articulation_points: BTreeSet<Vertex>,
    #[serde(skip)]
    pub state: DfsState,
}

/// Run a full DFS over `graph`, roots taken in the graph's vertex order.
pub fn detect(graph: &UndirectedGraph) -> Detection {
    detect_with_roots(graph, graph.vertices())
}

/// Run a full DFS offering `roots` first, then any vertex they did not reach.
pub fn detect_with_roots(
    graph: &UndirectedGraph,
    roots: impl IntoIterator<Item = Vertex>,
) -> Detection {
    let mut ctx = TraversalContext::new(graph, Scope::Whole, 0);
    let mut components = 0usize;

    for root in roots.into_iter().chain(graph.vertices()) {
        if graph.contains_vertex(root) && !ctx.is_discovered(root) {
            ctx.visit_from(root, None);
            components += 1;
        }
    }

    let output = ctx.finish();
    debug!(
        vertices = output.visited.len(),
        components,
        articulation_points = output.articulation.len(),
        "full DFS complete"
    );

    Detection {
        articulation_points: output.articulation,
        state: output.state,
    }
}

/// Articulation points of `graph`.
pub fn find_articulation_points(graph: &UndirectedGraph) -> BTreeSet<Vertex> {
    detect(graph).articulation_points
}

/// DFS state of `graph` (disc, low, parent) from a full pass.
pub fn compute_dfs_state(graph: &UndirectedGraph) -> DfsState {
    detect(graph).state
}
