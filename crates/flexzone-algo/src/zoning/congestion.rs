//! Congestion graph builder.
//!
//! Turns the flexible part of a [`Grid`] plus one period of line flows into
//! the undirected multigraph the heuristic works on. Each flexible line
//! becomes one edge carrying its overload `max(0, |flow| - capacity)`; lines
//! with a positive overload are also listed as [`CongestedLine`]s.

use std::collections::BTreeSet;

use flexzone_core::{Grid, LineFlows, LineId, Megawatts, NodeId, Period};
use serde::{Deserialize, Serialize};

use super::graph::{LineEdge, ZoneGraph};
use crate::error::{Result, ZoningError};

/// A flexible line whose flow exceeds its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongestedLine {
    pub line: LineId,
    pub from: NodeId,
    pub to: NodeId,
    pub congestion: Megawatts,
}

impl CongestedLine {
    /// Both endpoints lie in `nodes`.
    pub fn within(&self, nodes: &BTreeSet<NodeId>) -> bool {
        nodes.contains(&self.from) && nodes.contains(&self.to)
    }
}

impl From<LineEdge> for CongestedLine {
    fn from(edge: LineEdge) -> Self {
        Self {
            line: edge.line,
            from: edge.from,
            to: edge.to,
            congestion: edge.congestion,
        }
    }
}

/// The flexible area of one period, ready for partitioning.
#[derive(Debug, Clone)]
pub struct CongestionNetwork {
    pub period: Period,
    pub graph: ZoneGraph,
    /// Congested lines ordered by line id
    pub congested: Vec<CongestedLine>,
}

impl CongestionNetwork {
    pub fn total_congestion(&self) -> Megawatts {
        self.congested.iter().map(|c| c.congestion).sum()
    }
}

/// Build the congestion graph for `period`.
///
/// Every flexible node becomes a vertex and every flexible line an edge.
/// Fails if a flexible line touches a node outside the flexible area or if
/// `flows` lacks a value for a flexible line.
pub fn build_congestion_graph(
    grid: &Grid,
    flows: &LineFlows,
    period: Period,
) -> Result<CongestionNetwork> {
    let mut graph = ZoneGraph::new();
    for node in grid.flex_nodes() {
        graph.add_node(node.id);
    }

    let mut congested = Vec::new();
    for line in grid.flex_lines() {
        let flow = flows
            .get(line.id)
            .ok_or(ZoningError::MissingFlow {
                line: line.id,
                period,
            })?;
        let edge = LineEdge {
            line: line.id,
            from: line.from,
            to: line.to,
            congestion: line.congestion(flow),
        };
        if !graph.add_edge(edge) {
            return Err(ZoningError::DanglingLine {
                line: line.id,
                from: line.from,
                to: line.to,
            });
        }
        if edge.is_congested() {
            congested.push(CongestedLine::from(edge));
        }
    }

    Ok(CongestionNetwork {
        period,
        graph,
        congested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{flows_with, ring_grid};
    use flexzone_core::{GridLine, GridNode};

    #[test]
    fn test_ring_with_one_overload() {
        let grid = ring_grid(6, 100.0);
        let flows = flows_with(&grid, &[(3, 105.0)]);
        let network = build_congestion_graph(&grid, &flows, Period::new(0)).unwrap();

        assert_eq!(network.graph.node_count(), 6);
        assert_eq!(network.graph.edge_count(), 6);
        assert_eq!(network.congested.len(), 1);
        let line = network.congested[0];
        assert_eq!(line.line, LineId::new(3));
        assert_eq!((line.from.value(), line.to.value()), (3, 4));
        assert!((line.congestion.value() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_flow_counts_by_magnitude() {
        let grid = ring_grid(4, 50.0);
        let flows = flows_with(&grid, &[(1, -80.0), (2, 50.0)]);
        let network = build_congestion_graph(&grid, &flows, Period::new(0)).unwrap();
        assert_eq!(network.congested.len(), 1);
        assert!((network.total_congestion().value() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_elements_left_out() {
        let mut grid = ring_grid(4, 50.0);
        grid.add_node(GridNode::fixed(NodeId::new(100), "ext")).unwrap();
        grid.add_line(
            GridLine::new(LineId::new(100), NodeId::new(1), NodeId::new(100), Megawatts(1.0))
                .as_fixed(),
        )
        .unwrap();
        // no flow for the fixed line is fine
        let flows = flows_with(&grid, &[]);
        let network = build_congestion_graph(&grid, &flows, Period::new(0)).unwrap();
        assert_eq!(network.graph.node_count(), 4);
        assert!(!network.graph.contains(NodeId::new(100)));
    }

    #[test]
    fn test_missing_flow_is_an_error() {
        let grid = ring_grid(4, 50.0);
        let mut flows = flows_with(&grid, &[]);
        flows = flows.iter().filter(|(l, _)| l.value() != 2).collect();
        let err = build_congestion_graph(&grid, &flows, Period::new(7)).unwrap_err();
        assert!(matches!(
            err,
            ZoningError::MissingFlow { line, period } if line == LineId::new(2) && period == Period::new(7)
        ));
    }

    #[test]
    fn test_flex_line_into_fixed_node_is_an_error() {
        let mut grid = ring_grid(4, 50.0);
        grid.add_node(GridNode::fixed(NodeId::new(100), "ext")).unwrap();
        grid.add_line(GridLine::new(
            LineId::new(100),
            NodeId::new(1),
            NodeId::new(100),
            Megawatts(1.0),
        ))
        .unwrap();
        let flows = flows_with(&grid, &[]);
        let err = build_congestion_graph(&grid, &flows, Period::new(0)).unwrap_err();
        assert!(matches!(err, ZoningError::DanglingLine { .. }));
    }
}
