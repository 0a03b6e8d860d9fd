//! Working graph for zone partitioning.
//!
//! [`ZoneGraph`] wraps a petgraph `StableUnGraph` so edge removal never
//! invalidates the indices of the remaining nodes and edges. A side table
//! maps [`NodeId`] to `NodeIndex`; every query that iterates neighbors or
//! edges does so in ascending id order, which makes shortest paths and
//! traversals reproducible regardless of insertion history.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use flexzone_core::{LineId, Megawatts, NodeId};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

/// One flexible line as an edge of the zone graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineEdge {
    pub line: LineId,
    pub from: NodeId,
    pub to: NodeId,
    /// Overload of the line in this period; zero when uncongested
    pub congestion: Megawatts,
}

impl LineEdge {
    pub fn is_congested(&self) -> bool {
        self.congestion.value() > 0.0
    }

    /// Whether the edge has exactly one endpoint in `side`.
    pub fn crosses(&self, side: &BTreeSet<NodeId>) -> bool {
        side.contains(&self.from) != side.contains(&self.to)
    }
}

/// Undirected multigraph over node ids with stable indices.
#[derive(Debug, Clone, Default)]
pub struct ZoneGraph {
    graph: StableUnGraph<NodeId, LineEdge>,
    index: BTreeMap<NodeId, NodeIndex>,
}

impl ZoneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; adding an existing node is a no-op.
    pub fn add_node(&mut self, id: NodeId) {
        if !self.index.contains_key(&id) {
            let idx = self.graph.add_node(id);
            self.index.insert(id, idx);
        }
    }

    /// Add an edge between two existing nodes. Returns `false` (and adds
    /// nothing) when an endpoint is missing.
    pub fn add_edge(&mut self, edge: LineEdge) -> bool {
        match (self.index.get(&edge.from), self.index.get(&edge.to)) {
            (Some(&a), Some(&b)) => {
                self.graph.add_edge(a, b, edge);
                true
            }
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.index.keys().copied()
    }

    pub fn node_set(&self) -> BTreeSet<NodeId> {
        self.index.keys().copied().collect()
    }

    /// All edges, ordered by line id.
    pub fn edges(&self) -> Vec<LineEdge> {
        let mut edges: Vec<LineEdge> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_weight(e).copied())
            .collect();
        edges.sort_by_key(|e| e.line);
        edges
    }

    /// Distinct neighbors of `id`, ascending. Parallel lines count once.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeId> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n])
            .filter(|&n| n != id)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of distinct neighbors.
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Hop-count shortest path from `from` to `to`, inclusive of both ends.
    ///
    /// Breadth-first search expanding neighbors in ascending id order; the
    /// first discovery of a node fixes its predecessor. Returns `None` when
    /// either node is absent or `to` is unreachable.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }
        let mut pred: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut seen: BTreeSet<NodeId> = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if !seen.insert(next) {
                    continue;
                }
                pred.insert(next, current);
                if next == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while let Some(&p) = pred.get(&cursor) {
                        path.push(p);
                        cursor = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Every node reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, start: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        if !self.contains(start) {
            return seen;
        }
        seen.insert(start);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// An empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        match self.index.keys().next() {
            Some(&first) => self.reachable_from(first).len() == self.node_count(),
            None => true,
        }
    }

    /// Remove one edge between `a` and `b`. With parallel lines the one with
    /// the lowest line id goes first.
    pub fn remove_edge_between(&mut self, a: NodeId, b: NodeId) -> Option<LineEdge> {
        let target = self.edge_between(a, b)?;
        self.graph.remove_edge(target)
    }

    fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeIndex> {
        let (&ia, &ib) = (self.index.get(&a)?, self.index.get(&b)?);
        self.graph
            .edges(ia)
            .filter(|e| {
                let other = if e.source() == ia { e.target() } else { e.source() };
                other == ib
            })
            .min_by_key(|e| e.weight().line)
            .map(|e| e.id())
    }

    /// Subgraph induced by `nodes`: those nodes plus every edge with both
    /// endpoints among them. Nodes not present in `self` are ignored.
    pub fn induced(&self, nodes: &BTreeSet<NodeId>) -> ZoneGraph {
        let mut sub = ZoneGraph::new();
        for &id in nodes {
            if self.contains(id) {
                sub.add_node(id);
            }
        }
        for edge in self.edges() {
            if nodes.contains(&edge.from) && nodes.contains(&edge.to) {
                sub.add_edge(edge);
            }
        }
        sub
    }

    /// Edges with exactly one endpoint in `side`, ordered by line id.
    pub fn crossing_edges(&self, side: &BTreeSet<NodeId>) -> Vec<LineEdge> {
        self.edges()
            .into_iter()
            .filter(|edge| edge.crosses(side))
            .collect()
    }
}
