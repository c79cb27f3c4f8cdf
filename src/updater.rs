//! Incremental update of the DFS state after one edge addition.
//!
//! Given a DFS forest of `G` and a new edge `(x, y)` inside one tree, only
//! the subtree of their lowest common ancestor can change: a walk started
//! at the LCA reaches exactly that subtree through unvisited vertices,
//! with or without the new edge. The subtree is walked again with the
//! discovery counter resumed at `disc[lca]`, its entries are overwritten,
//! and everything else (ancestors included) keeps its numbers.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::dfs::traversal::{Scope, TraversalContext};
use crate::dfs::DfsState;
use crate::error::{CutVertexError, Result};
use crate::graph::{UndirectedGraph, Vertex};

/// Outcome of one incremental pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncrementalUpdate {
    /// Lowest common ancestor of the new edge's endpoints.
    pub lca: Vertex,
    /// Articulation points of the whole graph after the update.
    pub articulation_points: BTreeSet<Vertex>,
    /// Vertices whose DFS entries were recomputed, ascending.
    pub recomputed: Vec<Vertex>,
}

/// Lowest common ancestor of `x` and `y` in the DFS forest of `state`.
///
/// The deepest common ancestor is the one with the largest discovery time.
pub fn find_lca(x: Vertex, y: Vertex, state: &DfsState) -> Result<Vertex> {
    let path_x = state.path_to_root(x)?;
    let ancestors_y: HashSet<Vertex> = state.path_to_root(y)?.into_iter().collect();

    path_x
        .into_iter()
        .filter(|v| ancestors_y.contains(v))
        .max_by_key(|v| state.disc.get(v).copied().unwrap_or(0))
        .ok_or_else(|| {
            CutVertexError::inconsistent(format!(
                "vertices {} and {} share no DFS ancestor",
                x, y
            ))
        })
}

/// Repair `state` after `(x, y)` was added to `graph`.
///
/// `graph` must already contain the edge and `state` must be a valid DFS
/// forest of `graph` without it. On error `state` is left untouched and
/// the caller should recompute from scratch.
pub fn apply_edge_addition(
    graph: &UndirectedGraph,
    x: Vertex,
    y: Vertex,
    state: &mut DfsState,
) -> Result<IncrementalUpdate> {
    for endpoint in [x, y] {
        if !state.contains(endpoint) {
            return Err(CutVertexError::inconsistent(format!(
                "endpoint {} has no prior DFS entry",
                endpoint
            )));
        }
    }
    if !graph.contains_edge(x, y) {
        return Err(CutVertexError::inconsistent(format!(
            "edge ({}, {}) is not in the graph",
            x, y
        )));
    }

    let lca = find_lca(x, y, state)?;
    let lca_disc = state.disc[&lca];
    let lca_parent = state.parent[&lca];
    let members = state.subtree(lca);
    if lca_disc.checked_add(members.len()).is_none() {
        return Err(CutVertexError::inconsistent(format!(
            "disc[{}] = {} leaves no room to renumber its subtree",
            lca, lca_disc
        )));
    }
    debug!(x, y, lca, subtree = members.len(), "incremental update");

    let prior_points = state.articulation_points();

    let mut ctx = TraversalContext::new(
        graph,
        Scope::Subtree {
            members: &members,
            prior: &*state,
            floor: lca_disc,
        },
        lca_disc,
    );
    ctx.visit_from(lca, lca_parent);
    let output = ctx.finish();

    if let Some(anomaly) = output.anomaly {
        return Err(CutVertexError::inconsistent(anomaly));
    }
    if output.visited.len() != members.len() {
        return Err(CutVertexError::inconsistent(format!(
            "subtree of {} has {} vertices but only {} are reachable",
            lca,
            members.len(),
            output.visited.len()
        )));
    }

    for &v in &output.visited {
        state.record(
            v,
            output.state.disc[&v],
            output.state.low[&v],
            output.state.parent[&v],
        );
    }

    // Outside the subtree every low-link is unchanged, and so is every
    // cut-vertex verdict: the LCA's own low cannot move.
    let mut articulation_points: BTreeSet<Vertex> = prior_points
        .into_iter()
        .filter(|v| !members.contains(v))
        .collect();
    articulation_points.extend(output.articulation);

    let mut recomputed = output.visited;
    recomputed.sort_unstable();
    debug!(
        lca,
        recomputed = recomputed.len(),
        articulation_points = articulation_points.len(),
        "incremental update merged"
    );

    Ok(IncrementalUpdate {
        lca,
        articulation_points,
        recomputed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfs::{detect, find_articulation_points};

    fn graph(edges: &[(Vertex, Vertex)]) -> UndirectedGraph {
        UndirectedGraph::from_edges(edges.iter().copied())
    }

    /// Add `(x, y)` to `g` and apply the incremental update to a fresh full state.
    fn add_and_update(
        g: &mut UndirectedGraph,
        x: Vertex,
        y: Vertex,
    ) -> (Result<IncrementalUpdate>, DfsState) {
        let mut state = detect(g).state;
        g.add_edge(x, y);
        let result = apply_edge_addition(g, x, y, &mut state);
        (result, state)
    }

    #[test]
    fn test_find_lca_on_path() {
        let g = graph(&[(0, 1), (1, 2), (2, 3), (1, 4)]);
        let state = detect(&g).state;
        assert_eq!(find_lca(3, 4, &state).unwrap(), 1);
        assert_eq!(find_lca(3, 2, &state).unwrap(), 2);
        assert_eq!(find_lca(0, 3, &state).unwrap(), 0);
    }

    #[test]
    fn test_find_lca_across_trees_fails() {
        let g = graph(&[(0, 1), (5, 6)]);
        let state = detect(&g).state;
        assert!(matches!(
            find_lca(1, 6, &state),
            Err(CutVertexError::InconsistentPersistedState(_))
        ));
    }

    #[test]
    fn test_closing_a_path_into_a_cycle() {
        let mut g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let (result, state) = add_and_update(&mut g, 0, 4);
        let update = result.unwrap();

        assert_eq!(update.lca, 0);
        assert!(update.articulation_points.is_empty());
        assert_eq!(update.recomputed, vec![0, 1, 2, 3, 4]);
        state.validate(&g).unwrap();
    }

    #[test]
    fn test_shortcut_inside_branch() {
        // 0 - 1 - 2 - 3 - 4 - 5, then 2 - 4 closes a cycle deep in the path.
        let mut g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let before = detect(&g).state;
        let (result, state) = add_and_update(&mut g, 2, 4);
        let update = result.unwrap();

        assert_eq!(update.lca, 2);
        assert_eq!(update.recomputed, vec![2, 3, 4, 5]);
        assert_eq!(update.articulation_points, BTreeSet::from([1, 2, 4]));
        assert_eq!(update.articulation_points, find_articulation_points(&g));

        // Ancestors of the LCA keep their entries.
        for v in [0, 1] {
            assert_eq!(state.disc[&v], before.disc[&v]);
            assert_eq!(state.low[&v], before.low[&v]);
        }
        state.validate(&g).unwrap();
    }

    #[test]
    fn test_edge_between_sibling_subtrees() {
        // Root 0 with two branches; joining them removes 0 as a cut vertex.
        let mut g = graph(&[(0, 1), (1, 2), (0, 3), (3, 4)]);
        let (result, state) = add_and_update(&mut g, 2, 4);
        let update = result.unwrap();

        assert_eq!(update.lca, 0);
        assert!(update.articulation_points.is_empty());
        assert_eq!(update.articulation_points, find_articulation_points(&g));
        state.validate(&g).unwrap();
    }

    #[test]
    fn test_cycle_below_cut_vertex_keeps_it() {
        // Triangle 0-1-2 hanging a path 2-3-4-5; adding 3-5 keeps 2 a cut vertex.
        let mut g = graph(&[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5)]);
        let (result, state) = add_and_update(&mut g, 3, 5);
        let update = result.unwrap();

        assert_eq!(update.articulation_points, find_articulation_points(&g));
        assert!(update.articulation_points.contains(&2));
        assert!(!update.articulation_points.contains(&4));
        state.validate(&g).unwrap();
    }

    #[test]
    fn test_endpoint_without_prior_entry() {
        let g = graph(&[(0, 1), (1, 2)]);
        let mut state = detect(&g).state;
        let mut grown = g.clone();
        grown.add_edge(2, 9);

        let before = state.clone();
        let err = apply_edge_addition(&grown, 2, 9, &mut state).unwrap_err();
        assert!(matches!(err, CutVertexError::InconsistentPersistedState(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_edge_joining_components_is_rejected() {
        let mut g = graph(&[(0, 1), (5, 6)]);
        let (result, _) = add_and_update(&mut g, 1, 5);
        assert!(matches!(
            result,
            Err(CutVertexError::InconsistentPersistedState(_))
        ));
    }

    #[test]
    fn test_stale_state_is_rejected_untouched() {
        // The state hangs 4 below 3, but the graph reaches 4 only through 2,
        // which the state numbers after the subtree of 3.
        let mut g = graph(&[(0, 3), (0, 1), (1, 2), (2, 4)]);
        let mut state = DfsState::new();
        state.record(0, 0, 0, None);
        state.record(3, 1, 1, Some(0));
        state.record(4, 2, 2, Some(3));
        state.record(1, 3, 3, Some(0));
        state.record(2, 4, 4, Some(1));
        g.add_edge(3, 4);

        let before = state.clone();
        let err = apply_edge_addition(&g, 3, 4, &mut state).unwrap_err();
        assert!(matches!(err, CutVertexError::InconsistentPersistedState(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_huge_discovery_time_is_rejected_untouched() {
        let mut g = graph(&[(0, 1), (1, 2)]);
        let mut state = DfsState::new();
        state.record(0, usize::MAX - 2, usize::MAX - 2, None);
        state.record(1, usize::MAX - 1, usize::MAX - 1, Some(0));
        state.record(2, usize::MAX, usize::MAX, Some(1));
        g.add_edge(0, 2);

        let before = state.clone();
        let err = apply_edge_addition(&g, 0, 2, &mut state).unwrap_err();
        assert!(matches!(err, CutVertexError::InconsistentPersistedState(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_missing_edge_is_rejected() {
        let g = graph(&[(0, 1), (1, 2)]);
        let mut state = detect(&g).state;
        assert!(apply_edge_addition(&g, 0, 2, &mut state).is_err());
    }
}
