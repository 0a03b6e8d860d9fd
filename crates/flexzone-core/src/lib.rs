//! # flexzone-core: Grid Model for Flexibility-Area Zoning
//!
//! Provides the data structures the zone-partitioning heuristic consumes:
//! the transmission grid (nodes and lines, each flagged as part of the
//! flexible area or not) and per-period line flows from an upstream load
//! flow calculation.
//!
//! ## Design Philosophy
//!
//! - **Typed ids**: [`NodeId`], [`LineId`], [`ZoneId`] and [`Period`] are
//!   distinct newtypes, so a line id can never be used as a node id.
//! - **Ordered tables**: nodes and lines live in `BTreeMap`s keyed by id.
//!   Every iteration over the grid is in ascending id order, which is the
//!   canonical order the partitioning heuristic relies on for reproducible
//!   results.
//! - **Validation is advisory**: [`Grid::validate_into`] collects issues into
//!   [`Diagnostics`] rather than failing.
//!
//! ## Quick Start
//!
//! ```
//! use flexzone_core::*;
//!
//! let mut grid = Grid::new();
//! grid.add_node(GridNode::flex(NodeId::new(1), "N1")).unwrap();
//! grid.add_node(GridNode::flex(NodeId::new(2), "N2")).unwrap();
//! grid.add_line(GridLine::new(
//!     LineId::new(0),
//!     NodeId::new(1),
//!     NodeId::new(2),
//!     Megawatts(100.0),
//! ))
//! .unwrap();
//!
//! let mut flows = LineFlows::new();
//! flows.insert(LineId::new(0), Megawatts(-140.0));
//!
//! let line = grid.line(LineId::new(0)).unwrap();
//! assert_eq!(line.congestion(flows.get(line.id).unwrap()), Megawatts(40.0));
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Validation and diagnostic reporting
//! - [`graph_utils`] - Flexible-area connectivity (statistics, islands)
//! - [`units`] - Unit-safe power quantities

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{FlexError, FlexResult};
pub use graph_utils::*;
pub use units::Megawatts;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(usize);

impl NodeId {
    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl ZoneId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ZoneId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl Period {
    #[inline]
    pub fn new(value: usize) -> Self {
        Period(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node {}", self.0)
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}", self.0)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone {}", self.0)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// A grid node (bus).
#[derive(Debug, Clone, PartialEq)]
pub struct GridNode {
    pub id: NodeId,
    pub name: String,
    /// Part of the flexibility area and therefore eligible for zoning
    pub is_flex: bool,
}

impl GridNode {
    /// Node inside the flexibility area.
    pub fn flex(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_flex: true,
        }
    }

    /// Node outside the flexibility area. Such nodes always form their own
    /// single-node zone downstream.
    pub fn fixed(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_flex: false,
        }
    }
}

/// A transmission line between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub id: LineId,
    pub name: String,
    pub from: NodeId,
    pub to: NodeId,
    /// Thermal capacity (symmetric in both directions)
    pub capacity: Megawatts,
    pub is_flex: bool,
}

impl GridLine {
    /// Construct a flexible-area line with a generated name.
    pub fn new(id: LineId, from: NodeId, to: NodeId, capacity: Megawatts) -> Self {
        Self {
            id,
            name: format!("Line {}-{}", from.value(), to.value()),
            from,
            to,
            capacity,
            is_flex: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark the line as outside the flexibility area.
    pub fn as_fixed(mut self) -> Self {
        self.is_flex = false;
        self
    }

    /// Overload of this line for the given flow: `max(0, |flow| - capacity)`.
    #[inline]
    pub fn congestion(&self, flow: Megawatts) -> Megawatts {
        flow.excess_over(self.capacity)
    }

    /// Whether `node` is one of the line's endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}

/// Line flows for a single period, keyed by line id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineFlows(BTreeMap<LineId, Megawatts>);

impl LineFlows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: LineId, flow: Megawatts) -> Option<Megawatts> {
        self.0.insert(line, flow)
    }

    pub fn get(&self, line: LineId) -> Option<Megawatts> {
        self.0.get(&line).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineId, Megawatts)> + '_ {
        self.0.iter().map(|(line, flow)| (*line, *flow))
    }
}

impl FromIterator<(LineId, Megawatts)> for LineFlows {
    fn from_iter<I: IntoIterator<Item = (LineId, Megawatts)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Line flows for every simulated period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowSeries(BTreeMap<Period, LineFlows>);

impl FlowSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, period: Period, flows: LineFlows) -> Option<LineFlows> {
        self.0.insert(period, flows)
    }

    pub fn get(&self, period: Period) -> Option<&LineFlows> {
        self.0.get(&period)
    }

    /// Periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Period, &LineFlows)> + '_ {
        self.0.iter().map(|(period, flows)| (*period, flows))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Period, LineFlows)> for FlowSeries {
    fn from_iter<I: IntoIterator<Item = (Period, LineFlows)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The transmission grid: every node and line, flexible or not.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    nodes: BTreeMap<NodeId, GridNode>,
    lines: BTreeMap<LineId, GridLine>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails on a duplicate id.
    pub fn add_node(&mut self, node: GridNode) -> FlexResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(FlexError::Network(format!("duplicate node id {}", node.id.value())));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Add a line. Both endpoints must already exist.
    pub fn add_line(&mut self, line: GridLine) -> FlexResult<()> {
        if self.lines.contains_key(&line.id) {
            return Err(FlexError::Network(format!("duplicate line id {}", line.id.value())));
        }
        for endpoint in [line.from, line.to] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(FlexError::Network(format!(
                    "line {} references unknown node {}",
                    line.id.value(),
                    endpoint.value()
                )));
            }
        }
        self.lines.insert(line.id, line);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&GridNode> {
        self.nodes.get(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&GridLine> {
        self.lines.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.values()
    }

    pub fn lines(&self) -> impl Iterator<Item = &GridLine> {
        self.lines.values()
    }

    pub fn flex_nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.values().filter(|n| n.is_flex)
    }

    pub fn fixed_nodes(&self) -> impl Iterator<Item = &GridNode> {
        self.nodes.values().filter(|n| !n.is_flex)
    }

    pub fn flex_lines(&self) -> impl Iterator<Item = &GridLine> {
        self.lines.values().filter(|l| l.is_flex)
    }

    /// Ids of all flexible nodes, ascending.
    pub fn flex_node_ids(&self) -> BTreeSet<NodeId> {
        self.flex_nodes().map(|n| n.id).collect()
    }

    pub fn is_flex_node(&self, id: NodeId) -> bool {
        self.nodes.get(&id).map(|n| n.is_flex).unwrap_or(false)
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            num_nodes: self.nodes.len(),
            num_lines: self.lines.len(),
            ..GridStats::default()
        };
        stats.num_flex_nodes = self.flex_nodes().count();
        for line in self.flex_lines() {
            stats.num_flex_lines += 1;
            stats.total_flex_capacity = stats.total_flex_capacity + line.capacity;
        }
        stats
    }

    /// Validate the flexible area for issues that make partitioning
    /// meaningless or impossible.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        let stats = self.stats();

        if stats.num_flex_nodes == 0 {
            diag.add_error("structure", "Grid has no flexible nodes");
            return;
        }

        if stats.num_flex_lines == 0 && stats.num_flex_nodes > 1 {
            diag.add_warning(
                "structure",
                "Flexible area has multiple nodes but no flexible lines",
            );
        }

        for line in self.flex_lines() {
            let entity = line.id.to_string();
            if !self.is_flex_node(line.from) || !self.is_flex_node(line.to) {
                diag.add_error_with_entity(
                    "reference",
                    "Flexible line has an endpoint outside the flexible area",
                    &entity,
                );
            }
            if line.from == line.to {
                diag.add_warning_with_entity("structure", "Line is a self-loop", &entity);
            }
            if !line.capacity.is_finite() || line.capacity.value() <= 0.0 {
                diag.add_warning_with_entity(
                    "capacity",
                    &format!("Non-positive capacity ({})", line.capacity),
                    &entity,
                );
            }
        }

        let islands = flex_islands(self);
        if islands.islands.len() > 1 {
            diag.add_warning(
                "topology",
                &format!("Flexible area has {} islands", islands.islands.len()),
            );
        }
    }
}

/// Statistics about a grid's size and flexible area
#[derive(Debug, Clone, Default)]
pub struct GridStats {
    pub num_nodes: usize,
    pub num_flex_nodes: usize,
    pub num_lines: usize,
    pub num_flex_lines: usize,
    pub total_flex_capacity: Megawatts,
}

impl std::fmt::Display for GridStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes ({} flexible), {} lines ({} flexible, {:.0} MW capacity)",
            self.num_nodes,
            self.num_flex_nodes,
            self.num_lines,
            self.num_flex_lines,
            self.total_flex_capacity.value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_area_grid() -> Grid {
        let mut grid = Grid::new();
        for i in 1..=4 {
            grid.add_node(GridNode::flex(NodeId::new(i), format!("N{i}")))
                .unwrap();
        }
        grid.add_node(GridNode::fixed(NodeId::new(9), "External"))
            .unwrap();
        grid.add_line(GridLine::new(
            LineId::new(0),
            NodeId::new(1),
            NodeId::new(2),
            Megawatts(100.0),
        ))
        .unwrap();
        grid.add_line(GridLine::new(
            LineId::new(1),
            NodeId::new(2),
            NodeId::new(3),
            Megawatts(50.0),
        ))
        .unwrap();
        grid.add_line(GridLine::new(
            LineId::new(2),
            NodeId::new(3),
            NodeId::new(4),
            Megawatts(50.0),
        ))
        .unwrap();
        grid.add_line(
            GridLine::new(LineId::new(3), NodeId::new(4), NodeId::new(9), Megawatts(80.0))
                .as_fixed(),
        )
        .unwrap();
        grid
    }

    #[test]
    fn test_grid_creation() {
        let grid = two_area_grid();
        let stats = grid.stats();
        assert_eq!(stats.num_nodes, 5);
        assert_eq!(stats.num_flex_nodes, 4);
        assert_eq!(stats.num_lines, 4);
        assert_eq!(stats.num_flex_lines, 3);
        assert!((stats.total_flex_capacity.value() - 200.0).abs() < 1e-9);
        assert_eq!(grid.fixed_nodes().count(), 1);
    }

    #[test]
    fn test_flex_node_ids_are_sorted() {
        let grid = two_area_grid();
        let ids: Vec<usize> = grid.flex_node_ids().iter().map(|n| n.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut grid = two_area_grid();
        let err = grid
            .add_node(GridNode::flex(NodeId::new(1), "again"))
            .unwrap_err();
        assert!(matches!(err, FlexError::Network(_)));
    }

    #[test]
    fn test_line_with_unknown_endpoint_rejected() {
        let mut grid = two_area_grid();
        let err = grid
            .add_line(GridLine::new(
                LineId::new(10),
                NodeId::new(1),
                NodeId::new(42),
                Megawatts(10.0),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("unknown node 42"));
    }

    #[test]
    fn test_line_congestion() {
        let line = GridLine::new(LineId::new(0), NodeId::new(1), NodeId::new(2), Megawatts(100.0));
        assert_eq!(line.congestion(Megawatts(105.0)), Megawatts(5.0));
        assert_eq!(line.congestion(Megawatts(-99.0)), Megawatts(0.0));
        assert!(line.touches(NodeId::new(2)));
        assert!(!line.touches(NodeId::new(3)));
    }

    #[test]
    fn test_validation_clean_grid() {
        let grid = two_area_grid();
        let mut diag = Diagnostics::new();
        grid.validate_into(&mut diag);
        assert!(!diag.has_errors(), "{diag}");
        assert!(!diag.has_warnings(), "{diag}");
    }

    #[test]
    fn test_validation_empty_flex_area() {
        let mut grid = Grid::new();
        grid.add_node(GridNode::fixed(NodeId::new(1), "N1")).unwrap();
        let mut diag = Diagnostics::new();
        grid.validate_into(&mut diag);
        assert!(diag.errors().any(|i| i.message.contains("no flexible nodes")));
    }

    #[test]
    fn test_validation_flags_line_into_fixed_node() {
        let mut grid = two_area_grid();
        grid.add_line(GridLine::new(
            LineId::new(4),
            NodeId::new(1),
            NodeId::new(9),
            Megawatts(10.0),
        ))
        .unwrap();
        let mut diag = Diagnostics::new();
        grid.validate_into(&mut diag);
        assert_eq!(diag.issues_by_category("reference").count(), 1);
    }

    #[test]
    fn test_validation_flags_islands_and_capacity() {
        let mut grid = two_area_grid();
        grid.add_node(GridNode::flex(NodeId::new(5), "N5")).unwrap();
        grid.add_node(GridNode::flex(NodeId::new(6), "N6")).unwrap();
        grid.add_line(GridLine::new(
            LineId::new(5),
            NodeId::new(5),
            NodeId::new(6),
            Megawatts(0.0),
        ))
        .unwrap();
        let mut diag = Diagnostics::new();
        grid.validate_into(&mut diag);
        assert!(diag.warnings().any(|i| i.message.contains("2 islands")));
        assert_eq!(diag.issues_by_category("capacity").count(), 1);
    }

    #[test]
    fn test_flow_series_period_order() {
        let series: FlowSeries = [3, 1, 2]
            .into_iter()
            .map(|t| (Period::new(t), LineFlows::new()))
            .collect();
        let periods: Vec<usize> = series.periods().map(|p| p.value()).collect();
        assert_eq!(periods, vec![1, 2, 3]);
    }
}
