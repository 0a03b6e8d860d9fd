//! TargetedPartition: pick the most valuable bisection of one zone.

use std::collections::BTreeSet;

use flexzone_core::{LineId, Megawatts, NodeId};
use tracing::{debug, trace};

use super::congestion::CongestedLine;
use super::cut_line::{cut_line, CutOutcome};
use super::find_partitions::Anchor;
use super::graph::{LineEdge, ZoneGraph};

/// Best feasible bisection of a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSplit {
    /// Side grown by the bisection; becomes child `2i`
    pub first: BTreeSet<NodeId>,
    /// Remainder; becomes child `2i + 1`
    pub second: BTreeSet<NodeId>,
    /// Total congestion over `cut_edges`
    pub value: Megawatts,
    /// Zone edges with one endpoint on each side, by line id
    pub cut_edges: Vec<LineEdge>,
    /// Congested line the cut was aimed at
    pub anchor: LineId,
    pub grown_from: Anchor,
}

impl ZoneSplit {
    pub fn cut_lines(&self) -> Vec<LineId> {
        self.cut_edges.iter().map(|e| e.line).collect()
    }

    /// Congested lines among the cut edges.
    pub fn congested_cut(&self) -> usize {
        self.cut_edges.iter().filter(|e| e.is_congested()).count()
    }
}

/// Score of cutting `graph` along `side`: congestion summed over crossing edges.
pub fn cut_value(graph: &ZoneGraph, side: &BTreeSet<NodeId>) -> (Megawatts, Vec<LineEdge>) {
    let edges = graph.crossing_edges(side);
    let value = edges.iter().map(|e| e.congestion).sum();
    (value, edges)
}

/// Try every congested line of a zone as anchor pair for [`cut_line`] and
/// keep the feasible bisection with the highest cut value.
///
/// Later candidates win ties. Returns `None` when no line yields a feasible
/// bisection.
pub fn targeted_partition(
    graph: &ZoneGraph,
    min_nodes: usize,
    congested: &[CongestedLine],
) -> Option<ZoneSplit> {
    let mut best: Option<ZoneSplit> = None;

    for line in congested {
        if line.from == line.to {
            trace!(line = line.line.value(), "skipping self-loop anchor");
            continue;
        }
        let bisection = match cut_line(graph, line.from, line.to, min_nodes) {
            CutOutcome::Feasible(bisection) => bisection,
            outcome => {
                debug!(line = line.line.value(), ?outcome, "no feasible cut for line");
                continue;
            }
        };

        let (value, cut_edges) = cut_value(graph, &bisection.first);
        trace!(
            line = line.line.value(),
            value = value.value(),
            crossing = cut_edges.len(),
            "feasible cut"
        );
        let better = best
            .as_ref()
            .map_or(true, |current| value >= current.value);
        if better {
            best = Some(ZoneSplit {
                first: bisection.first,
                second: bisection.second,
                value,
                cut_edges,
                anchor: line.line,
                grown_from: bisection.grown_from,
            });
        }
    }

    best
}
