use crate::{Grid, LineId, NodeId};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Summary statistics of the flexible area (density/degree/connected components).
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// One connected island of the flexible area.
#[derive(Debug)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
}

/// Island membership of a single flexible node.
#[derive(Debug)]
pub struct NodeAssignment {
    pub node: NodeId,
    pub island_id: usize,
}

/// Aggregated island analysis result.
#[derive(Debug)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

/// Undirected graph of the flexible area: flexible nodes, and flexible
/// lines whose endpoints are both flexible. Nodes are inserted in ascending
/// id order, so `NodeIndex` order matches `NodeId` order.
pub fn flex_area_graph(grid: &Grid) -> UnGraph<NodeId, LineId> {
    let mut graph = UnGraph::new_undirected();
    let mut index: BTreeMap<NodeId, NodeIndex> = BTreeMap::new();
    for node in grid.flex_nodes() {
        index.insert(node.id, graph.add_node(node.id));
    }
    for line in grid.flex_lines() {
        if let (Some(&a), Some(&b)) = (index.get(&line.from), index.get(&line.to)) {
            graph.add_edge(a, b, line.id);
        }
    }
    graph
}

/// Degree distribution, density and component count of the flexible area.
pub fn flex_area_stats(grid: &Grid) -> GraphStats {
    let graph = flex_area_graph(grid);
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.neighbors(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    GraphStats {
        node_count,
        edge_count,
        connected_components: connected_components(&graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
    }
}

/// Labels connected components of the flexible area by breadth-first search.
/// Islands are numbered in order of their smallest node id.
pub fn flex_islands(grid: &Grid) -> IslandAnalysis {
    let graph = flex_area_graph(grid);
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = Vec::new();
    let mut island_id = 0;
    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in graph.neighbors(node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        islands.push(IslandSummary {
            island_id,
            node_count: members.len(),
        });
        for node in members {
            assignments.push(NodeAssignment {
                node: graph[node],
                island_id,
            });
        }
        island_id += 1;
    }
    assignments.sort_by_key(|assignment| assignment.node);
    IslandAnalysis {
        islands,
        assignments,
    }
}
