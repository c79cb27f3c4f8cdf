//! Explicit-stack DFS with Tarjan low-link bookkeeping.
//!
//! One [`TraversalContext`] carries the counter, the partial DFS state and
//! the frame stack, so call depth stays constant however long the paths in
//! the graph are. The same walker serves full detection (whole graph) and
//! the incremental updater (one prior subtree).

use petgraph::graphmap::Neighbors;
use petgraph::Undirected;
use std::collections::{BTreeSet, HashSet};

use super::state::DfsState;
use crate::graph::{UndirectedGraph, Vertex};

/// Which vertices a traversal may enter.
pub(crate) enum Scope<'a> {
    /// Every vertex of the graph.
    Whole,
    /// Only `members`. Neighbors outside it keep their `prior` discovery
    /// time, which must be smaller than `floor` (they are ancestors).
    Subtree {
        members: &'a HashSet<Vertex>,
        prior: &'a DfsState,
        floor: usize,
    },
}

struct Frame<'g> {
    vertex: Vertex,
    parent: Option<Vertex>,
    neighbors: Neighbors<'g, Vertex, Undirected>,
    parent_skipped: bool,
    children: usize,
}

/// What a traversal produced.
pub(crate) struct TraversalOutput {
    /// Entries for every vertex visited by this traversal only.
    pub state: DfsState,
    /// Cut vertices among the visited vertices.
    pub articulation: BTreeSet<Vertex>,
    /// Visited vertices in discovery order.
    pub visited: Vec<Vertex>,
    /// First neighbor outside the scope that did not look like an ancestor.
    pub anomaly: Option<String>,
}

pub(crate) struct TraversalContext<'g, 'a> {
    graph: &'g UndirectedGraph,
    scope: Scope<'a>,
    counter: usize,
    state: DfsState,
    articulation: BTreeSet<Vertex>,
    visited: Vec<Vertex>,
    anomaly: Option<String>,
    stack: Vec<Frame<'g>>,
}

impl<'g, 'a> TraversalContext<'g, 'a> {
    /// Start a traversal whose first discovery index is `counter`.
    pub(crate) fn new(graph: &'g UndirectedGraph, scope: Scope<'a>, counter: usize) -> Self {
        Self {
            graph,
            scope,
            counter,
            state: DfsState::new(),
            articulation: BTreeSet::new(),
            visited: Vec::new(),
            anomaly: None,
            stack: Vec::new(),
        }
    }

    pub(crate) fn is_discovered(&self, v: Vertex) -> bool {
        self.state.disc.contains_key(&v)
    }

    /// Run a depth-first walk from `root`. `root_parent` is the tree parent
    /// the root keeps (`None` for a traversal root of the whole forest).
    pub(crate) fn visit_from(&mut self, root: Vertex, root_parent: Option<Vertex>) {
        self.discover(root, root_parent);

        loop {
            let (u, next) = {
                let Some(frame) = self.stack.last_mut() else {
                    break;
                };
                let next = loop {
                    match frame.neighbors.next() {
                        // Skip the tree edge to the parent exactly once.
                        Some(v) if Some(v) == frame.parent && !frame.parent_skipped => {
                            frame.parent_skipped = true;
                        }
                        other => break other,
                    }
                };
                (frame.vertex, next)
            };

            match next {
                Some(v) => self.relax(u, v),
                None => self.retreat(),
            }
        }
    }

    pub(crate) fn finish(self) -> TraversalOutput {
        TraversalOutput {
            state: self.state,
            articulation: self.articulation,
            visited: self.visited,
            anomaly: self.anomaly,
        }
    }

    fn in_scope(&self, v: Vertex) -> bool {
        match &self.scope {
            Scope::Whole => true,
            Scope::Subtree { members, .. } => members.contains(&v),
        }
    }

    fn discover(&mut self, v: Vertex, parent: Option<Vertex>) {
        let t = self.counter;
        self.counter += 1;
        self.state.record(v, t, t, parent);
        self.visited.push(v);
        self.stack.push(Frame {
            vertex: v,
            parent,
            neighbors: self.graph.neighbors(v),
            parent_skipped: false,
            children: 0,
        });
    }

    /// Handle the edge `u - v` seen from the top frame.
    fn relax(&mut self, u: Vertex, v: Vertex) {
        if let Some(&disc_v) = self.state.disc.get(&v) {
            // Back edge within this traversal.
            self.lower(u, disc_v);
        } else if self.in_scope(v) {
            if let Some(frame) = self.stack.last_mut() {
                frame.children += 1;
            }
            self.discover(v, Some(u));
        } else {
            let ancestor_disc = match &self.scope {
                Scope::Whole => return,
                Scope::Subtree { prior, floor, .. } => {
                    prior.disc.get(&v).copied().filter(|&d| d < *floor)
                }
            };
            match ancestor_disc {
                Some(disc_v) => self.lower(u, disc_v),
                None => {
                    if self.anomaly.is_none() {
                        self.anomaly = Some(format!(
                            "edge ({}, {}) leaves the subtree to a non-ancestor",
                            u, v
                        ));
                    }
                }
            }
        }
    }

    /// Pop the finished top frame and fold its low-link into its parent.
    fn retreat(&mut self) {
        let Some(done) = self.stack.pop() else {
            return;
        };
        let low_done = self.state.low[&done.vertex];

        match self.stack.last() {
            Some(parent_frame) => {
                let p = parent_frame.vertex;
                let p_is_root = parent_frame.parent.is_none();
                self.lower(p, low_done);
                if !p_is_root && low_done >= self.state.disc[&p] {
                    self.articulation.insert(p);
                }
            }
            None => {
                if done.parent.is_none() && done.children > 1 {
                    self.articulation.insert(done.vertex);
                }
            }
        }
    }

    fn lower(&mut self, v: Vertex, candidate: usize) {
        if let Some(low) = self.state.low.get_mut(&v) {
            if candidate < *low {
                *low = candidate;
            }
        }
    }
}
