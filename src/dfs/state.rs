//! DFS state: discovery time, low-link and tree parent per vertex.
//!
//! Keys are vertex ids. Serialized through serde_json the maps become
//! objects keyed by the vertex's decimal text and are parsed straight
//! back into [`Vertex`] on load, so the live state never holds string ids.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::{CutVertexError, Result};
use crate::graph::{UndirectedGraph, Vertex};

/// Three parallel maps describing one DFS forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfsState {
    /// Order in which each vertex was first visited.
    pub disc: BTreeMap<Vertex, usize>,
    /// Minimum discovery time reachable from the vertex's subtree via at most one back edge.
    pub low: BTreeMap<Vertex, usize>,
    /// DFS-tree parent, `None` for traversal roots.
    pub parent: BTreeMap<Vertex, Option<Vertex>>,
}

impl DfsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices with a discovery entry.
    pub fn len(&self) -> usize {
        self.disc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disc.is_empty()
    }

    /// True when `v` has an entry in all three maps.
    pub fn contains(&self, v: Vertex) -> bool {
        self.disc.contains_key(&v) && self.low.contains_key(&v) && self.parent.contains_key(&v)
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.disc.keys().copied()
    }

    /// Overwrite the entry for `v`.
    pub fn record(&mut self, v: Vertex, disc: usize, low: usize, parent: Option<Vertex>) {
        self.disc.insert(v, disc);
        self.low.insert(v, low);
        self.parent.insert(v, parent);
    }

    pub fn remove(&mut self, v: Vertex) {
        self.disc.remove(&v);
        self.low.remove(&v);
        self.parent.remove(&v);
    }

    /// Renumber discovery times to `0..len` keeping their order. Low-links
    /// that name a discovery time follow it; any other value is left for
    /// [`DfsState::validate`] to reject.
    pub fn compact(&mut self) {
        let mut times: Vec<usize> = self.disc.values().copied().collect();
        times.sort_unstable();
        let rank: HashMap<usize, usize> = times.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        for d in self.disc.values_mut() {
            *d = rank[&*d];
        }
        for l in self.low.values_mut() {
            if let Some(&r) = rank.get(l) {
                *l = r;
            }
        }
    }

    /// The discovery index the next new root would receive.
    pub fn next_discovery(&self) -> usize {
        self.disc
            .values()
            .max()
            .map_or(0, |&d| d.saturating_add(1))
    }

    /// Add `v` as a singleton traversal root.
    pub fn seed_root(&mut self, v: Vertex) {
        let disc = self.next_discovery();
        self.record(v, disc, disc, None);
    }

    /// Tree children of every vertex, each list ordered by discovery time.
    pub fn children_index(&self) -> HashMap<Vertex, Vec<Vertex>> {
        let mut children: HashMap<Vertex, Vec<Vertex>> = HashMap::new();
        for (&v, &p) in &self.parent {
            if let Some(p) = p {
                children.entry(p).or_default().push(v);
            }
        }
        for list in children.values_mut() {
            list.sort_by_key(|c| self.disc.get(c).copied().unwrap_or(usize::MAX));
        }
        children
    }

    /// `root` and every vertex below it in the DFS tree.
    pub fn subtree(&self, root: Vertex) -> HashSet<Vertex> {
        let children = self.children_index();
        let mut members = HashSet::new();
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            if !members.insert(v) {
                continue;
            }
            if let Some(kids) = children.get(&v) {
                stack.extend(kids.iter().copied());
            }
        }
        members
    }

    /// Walk parent pointers from `v` up to its root, `v` first.
    pub fn path_to_root(&self, v: Vertex) -> Result<Vec<Vertex>> {
        let mut path = Vec::new();
        let mut current = Some(v);
        while let Some(node) = current {
            if path.len() > self.parent.len() {
                return Err(CutVertexError::inconsistent(format!(
                    "parent chain from {} does not reach a root",
                    v
                )));
            }
            let parent = self.parent.get(&node).ok_or_else(|| {
                CutVertexError::inconsistent(format!("vertex {} has no parent entry", node))
            })?;
            path.push(node);
            current = *parent;
        }
        Ok(path)
    }

    /// Articulation points implied by this state.
    ///
    /// A root is a cut vertex iff it has more than one tree child; any other
    /// vertex `u` is one iff some child `c` has `low[c] >= disc[u]`. Only
    /// meaningful for a state that is a valid DFS forest of the graph.
    pub fn articulation_points(&self) -> BTreeSet<Vertex> {
        let mut points = BTreeSet::new();
        let mut root_children: HashMap<Vertex, usize> = HashMap::new();

        for (&child, &parent) in &self.parent {
            let Some(p) = parent else { continue };
            match self.parent.get(&p) {
                Some(None) => *root_children.entry(p).or_default() += 1,
                Some(Some(_)) => {
                    if let (Some(&low_child), Some(&disc_p)) =
                        (self.low.get(&child), self.disc.get(&p))
                    {
                        if low_child >= disc_p {
                            points.insert(p);
                        }
                    }
                }
                None => {}
            }
        }

        points.extend(
            root_children
                .into_iter()
                .filter(|&(_, count)| count > 1)
                .map(|(root, _)| root),
        );
        points
    }

    /// Check that this state is a valid DFS forest of `graph` with correct low-links.
    ///
    /// Verifies: one entry per graph vertex and no others; unique discovery
    /// times; each parent is an adjacent, earlier-discovered vertex; every
    /// subtree occupies a contiguous discovery range (preorder); every
    /// non-tree edge joins an ancestor and a descendant; every stored low
    /// equals the value its children and back edges imply.
    pub fn validate(&self, graph: &UndirectedGraph) -> Result<()> {
        let n = graph.vertex_count();
        if self.disc.len() != n || self.low.len() != n || self.parent.len() != n {
            return Err(CutVertexError::inconsistent(format!(
                "state covers {}/{}/{} vertices, graph has {}",
                self.disc.len(),
                self.low.len(),
                self.parent.len(),
                n
            )));
        }

        if let Some(v) = graph.vertices().find(|&v| !self.contains(v)) {
            return Err(CutVertexError::inconsistent(format!(
                "vertex {} has no DFS entry",
                v
            )));
        }

        // A forest of n vertices numbers them 0..n; larger values are corrupt.
        if let Some(v) = graph.vertices().find(|v| self.disc[v] >= n) {
            return Err(CutVertexError::inconsistent(format!(
                "disc[{}] = {} is out of range for {} vertices",
                v, self.disc[&v], n
            )));
        }

        let mut seen_disc = HashSet::with_capacity(n);
        for v in graph.vertices() {
            if !seen_disc.insert(self.disc[&v]) {
                return Err(CutVertexError::inconsistent(format!(
                    "discovery time {} is assigned twice",
                    self.disc[&v]
                )));
            }
            if self.low[&v] > self.disc[&v] {
                return Err(CutVertexError::inconsistent(format!(
                    "low[{}] exceeds disc[{}]",
                    v, v
                )));
            }
            if let Some(p) = self.parent[&v] {
                if !graph.contains_edge(v, p) {
                    return Err(CutVertexError::inconsistent(format!(
                        "tree edge ({}, {}) is not in the graph",
                        p, v
                    )));
                }
                if self.disc[&p] >= self.disc[&v] {
                    return Err(CutVertexError::inconsistent(format!(
                        "parent {} discovered after child {}",
                        p, v
                    )));
                }
            }
        }

        // Children always carry larger discovery times than their parent,
        // so a descending sweep sees every subtree before its root.
        let mut by_disc: Vec<Vertex> = graph.vertices().collect();
        by_disc.sort_unstable_by_key(|v| std::cmp::Reverse(self.disc[v]));

        let children = self.children_index();
        let mut size: HashMap<Vertex, usize> = HashMap::with_capacity(n);
        for &v in &by_disc {
            let mut total = 1;
            let mut expected = self.disc[&v] + 1;
            for c in children.get(&v).into_iter().flatten() {
                if self.disc[c] != expected {
                    return Err(CutVertexError::inconsistent(format!(
                        "subtree of {} is not numbered in preorder",
                        v
                    )));
                }
                expected += size[c];
                total += size[c];
            }
            size.insert(v, total);
        }

        let is_ancestor = |a: Vertex, d: Vertex| {
            let (da, dd) = (self.disc[&a], self.disc[&d]);
            da <= dd && dd < da + size[&a]
        };

        for &u in &by_disc {
            let parent = self.parent[&u];
            let mut expected_low = self.disc[&u];
            for w in graph.neighbors(u) {
                if Some(w) == parent {
                    continue;
                }
                if self.parent[&w] == Some(u) {
                    expected_low = expected_low.min(self.low[&w]);
                    continue;
                }
                if !is_ancestor(w, u) && !is_ancestor(u, w) {
                    return Err(CutVertexError::inconsistent(format!(
                        "edge ({}, {}) crosses between DFS subtrees",
                        u, w
                    )));
                }
                expected_low = expected_low.min(self.disc[&w]);
            }
            if self.low[&u] != expected_low {
                return Err(CutVertexError::inconsistent(format!(
                    "low[{}] is {}, expected {}",
                    u, self.low[&u], expected_low
                )));
            }
        }

        Ok(())
    }
}
