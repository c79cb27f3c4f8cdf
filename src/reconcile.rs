//! Reconciliation: bring the persisted DFS state in line with the current graph.
//!
//! Policy, once per run:
//!
//! 1. no prior snapshot: full recompute
//! 2. any prior edge missing from the graph: full recompute
//! 3. same edge set: reuse the prior state
//! 4. only additions: repair the state once per added edge, in ascending
//!    edge order, each pass against the tree left by the one before
//!
//! Whenever the prior state turns out not to describe the graph (failed
//! validation, an added edge that joins two DFS trees, a failed repair) the
//! run falls back to a full recompute. Errors of that kind never escape.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{ArticulationStrategy, CutVertexConfig};
use crate::dfs::{detect, DfsState};
use crate::error::{CutVertexError, Result};
use crate::graph::{Edge, UndirectedGraph, Vertex};
use crate::storage::{self, Snapshot};
use crate::updater::apply_edge_addition;

/// Why a run recomputed everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FullReason {
    /// First run: nothing persisted yet.
    MissingSnapshot,
    /// At least one persisted edge is gone.
    EdgeRemovalDetected,
    /// The persisted state does not describe the graph.
    InconsistentPersistedState(String),
    /// An added edge connects two separate DFS trees.
    ComponentsJoined(Edge),
    /// More additions than `max_incremental_edges`.
    TooManyAdditions(usize),
}

impl fmt::Display for FullReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSnapshot => write!(f, "no prior snapshot"),
            Self::EdgeRemovalDetected => write!(f, "edges removed"),
            Self::InconsistentPersistedState(reason) => {
                write!(f, "inconsistent persisted state: {}", reason)
            }
            Self::ComponentsJoined(edge) => write!(f, "edge {} joins two components", edge),
            Self::TooManyAdditions(count) => write!(f, "{} edges added", count),
        }
    }
}

/// How the state of a run was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    Full(FullReason),
    Reused,
    Incremental { edges: Vec<Edge> },
}

impl ReconcileMode {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }
}

impl fmt::Display for ReconcileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(reason) => write!(f, "full ({})", reason),
            Self::Reused => write!(f, "reused"),
            Self::Incremental { edges } => {
                let edges: Vec<String> = edges.iter().map(|e| e.to_string()).collect();
                write!(f, "incremental ({})", edges.join(", "))
            }
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub mode: ReconcileMode,
    #[serde(skip)]
    pub state: DfsState,
    pub articulation_points: BTreeSet<Vertex>,
    /// Vertices whose DFS entries were (re)assigned this run, ascending.
    pub recomputed: Vec<Vertex>,
    /// Whether the snapshot was written.
    pub saved: bool,
}

/// Run the reconciliation policy for `graph` against an optional prior snapshot.
pub fn reconcile(
    graph: &UndirectedGraph,
    prior: Option<&Snapshot>,
    config: &CutVertexConfig,
) -> ReconcileOutcome {
    let Some(prior) = prior else {
        return full_recompute(graph, FullReason::MissingSnapshot);
    };

    let prior_edges = prior.edge_set();
    let current_edges = graph.edge_set();

    let removed = prior_edges.difference(&current_edges).count();
    if removed > 0 {
        info!(removed, "edges removed since last run");
        return full_recompute(graph, FullReason::EdgeRemovalDetected);
    }

    let added: Vec<Edge> = current_edges.difference(&prior_edges).copied().collect();
    let limit = config.reconcile.max_incremental_edges;
    if added.len() > limit {
        info!(added = added.len(), limit, "too many additions for incremental repair");
        return full_recompute(graph, FullReason::TooManyAdditions(added.len()));
    }

    match repair(graph, prior, &added, config) {
        Ok(outcome) => outcome,
        Err(RepairError::Joined(edge)) => {
            info!(%edge, "added edge joins two DFS trees");
            full_recompute(graph, FullReason::ComponentsJoined(edge))
        }
        Err(RepairError::Inconsistent(e)) => {
            warn!(error = %e, "persisted state rejected, recomputing");
            full_recompute(graph, FullReason::InconsistentPersistedState(e.to_string()))
        }
    }
}

/// Load the snapshot at `state_path`, reconcile `graph` against it, and
/// save the result if it differs from what was loaded.
///
/// A snapshot that cannot be parsed is treated as inconsistent state and
/// replaced. I/O failures other than a missing file are returned.
pub fn analyze(
    graph: &UndirectedGraph,
    state_path: &Path,
    config: &CutVertexConfig,
) -> Result<ReconcileOutcome> {
    let (prior, mut outcome) = match storage::load(state_path) {
        Ok(prior) => {
            let outcome = reconcile(graph, prior.as_ref(), config);
            (prior, outcome)
        }
        Err(CutVertexError::Snapshot(e)) => {
            warn!(path = %state_path.display(), error = %e, "snapshot unreadable, rebuilding");
            let reason = FullReason::InconsistentPersistedState(format!("unreadable snapshot: {}", e));
            (None, full_recompute(graph, reason))
        }
        Err(e) => return Err(e),
    };

    let snapshot = Snapshot::capture(graph, &outcome.state);
    if prior.as_ref() != Some(&snapshot) {
        storage::write_snapshot(state_path, &snapshot, config.state.pretty)?;
        outcome.saved = true;
    } else {
        debug!(path = %state_path.display(), "snapshot unchanged");
    }

    info!(
        mode = %outcome.mode,
        articulation_points = outcome.articulation_points.len(),
        recomputed = outcome.recomputed.len(),
        saved = outcome.saved,
        "reconciled"
    );
    Ok(outcome)
}

fn full_recompute(graph: &UndirectedGraph, reason: FullReason) -> ReconcileOutcome {
    info!(%reason, "full recompute");
    let detection = detect(graph);
    ReconcileOutcome {
        mode: ReconcileMode::Full(reason),
        state: detection.state,
        articulation_points: detection.articulation_points,
        recomputed: graph.sorted_vertices(),
        saved: false,
    }
}

enum RepairError {
    Joined(Edge),
    Inconsistent(CutVertexError),
}

impl From<CutVertexError> for RepairError {
    fn from(e: CutVertexError) -> Self {
        Self::Inconsistent(e)
    }
}

/// Carry the prior state forward to `graph`, adding `added` one edge at a time.
fn repair(
    graph: &UndirectedGraph,
    prior: &Snapshot,
    added: &[Edge],
    config: &CutVertexConfig,
) -> std::result::Result<ReconcileOutcome, RepairError> {
    let mut state = prior.dfs_state.clone();

    // Prior-only vertices had no edges (none were removed); drop them.
    let vanished: Vec<Vertex> = state
        .vertices()
        .filter(|&v| !graph.contains_vertex(v))
        .collect();
    for &v in &vanished {
        state.remove(v);
    }
    if !vanished.is_empty() {
        state.compact();
    }

    let mut recomputed = BTreeSet::new();
    for v in graph.sorted_vertices() {
        if !state.contains(v) {
            state.seed_root(v);
            recomputed.insert(v);
        }
    }
    if !vanished.is_empty() || !recomputed.is_empty() {
        debug!(
            dropped = vanished.len(),
            seeded = recomputed.len(),
            "vertex set changed"
        );
    }

    // The graph as it was last run, over today's vertices.
    let mut working = UndirectedGraph::from_parts(graph.vertices(), prior.graph.edges.iter().copied());
    state.validate(&working)?;

    if added.is_empty() {
        let articulation_points = articulation_for(graph, &state, config);
        return Ok(ReconcileOutcome {
            mode: ReconcileMode::Reused,
            state,
            articulation_points,
            recomputed: recomputed.into_iter().collect(),
            saved: false,
        });
    }

    for &edge in added {
        let (x, y) = edge.endpoints();
        if root_of(&state, x)? != root_of(&state, y)? {
            return Err(RepairError::Joined(edge));
        }
        working.add_edge(x, y);
        let update = apply_edge_addition(&working, x, y, &mut state)?;
        recomputed.extend(update.recomputed);
    }

    let articulation_points = articulation_for(graph, &state, config);
    Ok(ReconcileOutcome {
        mode: ReconcileMode::Incremental {
            edges: added.to_vec(),
        },
        state,
        articulation_points,
        recomputed: recomputed.into_iter().collect(),
        saved: false,
    })
}

fn articulation_for(
    graph: &UndirectedGraph,
    state: &DfsState,
    config: &CutVertexConfig,
) -> BTreeSet<Vertex> {
    match config.reconcile.articulation {
        ArticulationStrategy::Derived => state.articulation_points(),
        ArticulationStrategy::Traversal => detect(graph).articulation_points,
    }
}

fn root_of(state: &DfsState, v: Vertex) -> Result<Vertex> {
    let path = state.path_to_root(v)?;
    path.last()
        .copied()
        .ok_or_else(|| CutVertexError::inconsistent(format!("vertex {} has no DFS root", v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfs::{compute_dfs_state, find_articulation_points};
    use std::fs;

    fn graph(edges: &[(Vertex, Vertex)]) -> UndirectedGraph {
        UndirectedGraph::from_edges(edges.iter().copied())
    }

    fn snapshot_of(g: &UndirectedGraph) -> Snapshot {
        Snapshot::capture(g, &compute_dfs_state(g))
    }

    fn config() -> CutVertexConfig {
        CutVertexConfig::default()
    }

    #[test]
    fn test_first_run_is_full() {
        let g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4), (3, 5)]);
        let outcome = reconcile(&g, None, &config());

        assert_eq!(outcome.mode, ReconcileMode::Full(FullReason::MissingSnapshot));
        assert_eq!(outcome.articulation_points, BTreeSet::from([1, 2, 3]));
        assert_eq!(outcome.recomputed, vec![0, 1, 2, 3, 4, 5]);
        outcome.state.validate(&g).unwrap();
    }

    #[test]
    fn test_unchanged_graph_reuses_state() {
        let g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4), (3, 5)]);
        let prior = snapshot_of(&g);
        let outcome = reconcile(&g, Some(&prior), &config());

        assert_eq!(outcome.mode, ReconcileMode::Reused);
        assert_eq!(outcome.state, prior.dfs_state);
        assert!(outcome.recomputed.is_empty());
        assert_eq!(outcome.articulation_points, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_removal_forces_full() {
        let before = graph(&[(0, 1), (1, 2), (2, 0), (2, 3)]);
        let prior = snapshot_of(&before);
        let after = graph(&[(0, 1), (1, 2), (2, 3), (3, 0)]);

        let outcome = reconcile(&after, Some(&prior), &config());
        assert_eq!(outcome.mode, ReconcileMode::Full(FullReason::EdgeRemovalDetected));
        assert_eq!(outcome.articulation_points, find_articulation_points(&after));
        assert!(outcome.articulation_points.is_empty());
    }

    #[test]
    fn test_single_addition_is_incremental() {
        let before = graph(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let prior = snapshot_of(&before);
        let mut after = before.clone();
        after.add_edge(4, 2);

        let outcome = reconcile(&after, Some(&prior), &config());
        assert_eq!(
            outcome.mode,
            ReconcileMode::Incremental {
                edges: vec![Edge::new(2, 4)]
            }
        );
        assert_eq!(outcome.recomputed, vec![2, 3, 4, 5]);
        assert_eq!(outcome.articulation_points, BTreeSet::from([1, 2, 4]));
        outcome.state.validate(&after).unwrap();
    }

    #[test]
    fn test_multiple_additions_match_full() {
        // Two cycles closed in separate branches plus one joining them.
        let before = graph(&[(0, 1), (1, 2), (2, 3), (0, 4), (4, 5), (5, 6), (6, 7)]);
        let prior = snapshot_of(&before);
        let mut after = before.clone();
        for (u, v) in [(1, 3), (4, 7), (2, 6)] {
            after.add_edge(u, v);
        }

        let outcome = reconcile(&after, Some(&prior), &config());
        assert!(matches!(outcome.mode, ReconcileMode::Incremental { ref edges } if edges.len() == 3));
        assert_eq!(outcome.articulation_points, find_articulation_points(&after));
        outcome.state.validate(&after).unwrap();
    }

    #[test]
    fn test_too_many_additions() {
        let before = graph(&[(0, 1), (1, 2), (2, 3)]);
        let prior = snapshot_of(&before);
        let after = graph(&[(0, 1), (1, 2), (2, 3), (0, 2), (1, 3)]);

        let mut config = config();
        config.reconcile.max_incremental_edges = 1;
        let outcome = reconcile(&after, Some(&prior), &config);
        assert_eq!(outcome.mode, ReconcileMode::Full(FullReason::TooManyAdditions(2)));
        assert_eq!(outcome.articulation_points, find_articulation_points(&after));
    }

    #[test]
    fn test_new_vertex_is_seeded() {
        let before = graph(&[(0, 1), (1, 2)]);
        let prior = snapshot_of(&before);
        let mut after = before.clone();
        after.add_vertex(9);

        let outcome = reconcile(&after, Some(&prior), &config());
        assert_eq!(outcome.mode, ReconcileMode::Reused);
        assert_eq!(outcome.recomputed, vec![9]);
        assert_eq!(outcome.state.parent[&9], None);
        outcome.state.validate(&after).unwrap();
    }

    #[test]
    fn test_vanished_vertex_is_dropped() {
        let mut before = graph(&[(1, 2), (2, 3)]);
        before.add_vertex(0);
        let prior = Snapshot::capture(&before, &crate::dfs::detect_with_roots(&before, [0]).state);
        assert_eq!(prior.dfs_state.disc[&0], 0);

        let after = graph(&[(1, 2), (2, 3)]);
        let outcome = reconcile(&after, Some(&prior), &config());
        assert_eq!(outcome.mode, ReconcileMode::Reused);
        assert!(!outcome.state.contains(0));
        assert_eq!(outcome.articulation_points, BTreeSet::from([2]));
        outcome.state.validate(&after).unwrap();
    }

    #[test]
    fn test_edge_joining_trees_falls_back() {
        let before = graph(&[(0, 1), (1, 2), (5, 6)]);
        let prior = snapshot_of(&before);
        let mut after = before.clone();
        after.add_edge(2, 5);

        let outcome = reconcile(&after, Some(&prior), &config());
        assert_eq!(
            outcome.mode,
            ReconcileMode::Full(FullReason::ComponentsJoined(Edge::new(2, 5)))
        );
        assert_eq!(outcome.articulation_points, BTreeSet::from([1, 2, 5]));
    }

    #[test]
    fn test_corrupted_state_falls_back() {
        let g = graph(&[(0, 1), (1, 2), (2, 0), (2, 3)]);
        let mut prior = snapshot_of(&g);
        prior.dfs_state.low.insert(3, 0);

        let outcome = reconcile(&g, Some(&prior), &config());
        assert!(matches!(
            outcome.mode,
            ReconcileMode::Full(FullReason::InconsistentPersistedState(_))
        ));
        assert_eq!(outcome.articulation_points, BTreeSet::from([2]));
    }

    #[test]
    fn test_huge_discovery_time_falls_back() {
        let prior = Snapshot::from_json(
            r#"{
                "graph": { "vertices": [0, 1], "edges": [[0, 1]] },
                "dfs_state": {
                    "disc": { "0": 0, "1": 18446744073709551615 },
                    "low": { "0": 0, "1": 1 },
                    "parent": { "0": null, "1": 0 }
                }
            }"#,
        )
        .unwrap();

        let g = graph(&[(0, 1)]);
        let outcome = reconcile(&g, Some(&prior), &config());
        assert!(matches!(
            outcome.mode,
            ReconcileMode::Full(FullReason::InconsistentPersistedState(_))
        ));
        outcome.state.validate(&g).unwrap();

        // Seeding a new vertex on top of the corrupt numbering must not overflow either.
        let mut grown = g.clone();
        grown.add_vertex(2);
        let outcome = reconcile(&grown, Some(&prior), &config());
        assert!(matches!(
            outcome.mode,
            ReconcileMode::Full(FullReason::InconsistentPersistedState(_))
        ));
        assert!(outcome.articulation_points.is_empty());
    }

    #[test]
    fn test_traversal_strategy_agrees() {
        let before = graph(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let prior = snapshot_of(&before);
        let mut after = before.clone();
        after.add_edge(1, 3);

        let mut config = config();
        config.reconcile.articulation = ArticulationStrategy::Traversal;
        let outcome = reconcile(&after, Some(&prior), &config);
        assert_eq!(outcome.articulation_points, BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4), (3, 5)]);

        let first = analyze(&g, &path, &config()).unwrap();
        assert!(first.saved);
        let bytes = fs::read(&path).unwrap();

        let second = analyze(&g, &path, &config()).unwrap();
        assert_eq!(second.mode, ReconcileMode::Reused);
        assert!(!second.saved);
        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert_eq!(second.articulation_points, first.articulation_points);
    }

    #[test]
    fn test_analyze_persists_incremental_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let mut g = graph(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        analyze(&g, &path, &config()).unwrap();

        g.add_edge(0, 4);
        let outcome = analyze(&g, &path, &config()).unwrap();
        assert!(matches!(outcome.mode, ReconcileMode::Incremental { .. }));
        assert!(outcome.saved);

        let stored = storage::load(&path).unwrap().unwrap();
        assert_eq!(stored.dfs_state, outcome.state);
        assert_eq!(stored.edge_set(), g.edge_set());
    }

    #[test]
    fn test_analyze_replaces_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "not json").unwrap();
        let g = graph(&[(0, 1), (1, 2)]);

        let outcome = analyze(&g, &path, &config()).unwrap();
        assert!(matches!(
            outcome.mode,
            ReconcileMode::Full(FullReason::InconsistentPersistedState(_))
        ));
        assert!(outcome.saved);
        assert!(storage::load(&path).unwrap().is_some());
    }
}
