//! Per-period zone maps handed to market clearing.

use std::collections::{BTreeMap, BTreeSet};

use flexzone_core::{Grid, GridLine, LineId, NodeId, Period, ZoneId};
use serde::{Deserialize, Serialize};

use super::heuristic::{Heuristic, PartitionSummary};

/// Final zones and cut lines, keyed by period.
///
/// Zones are numbered `1..=k` in the order the heuristic left them active;
/// the heuristic's internal ids are not kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Zones {
    nodes: BTreeMap<Period, BTreeMap<ZoneId, BTreeSet<NodeId>>>,
    cut_lines: BTreeMap<Period, Vec<LineId>>,
    summaries: BTreeMap<Period, PartitionSummary>,
}

impl Zones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a finished run, replacing any earlier result
    /// for the same period.
    pub fn extract(&mut self, heuristic: &Heuristic) {
        let period = heuristic.period();
        let zones = heuristic
            .final_zones()
            .into_iter()
            .enumerate()
            .map(|(index, (_, nodes))| (ZoneId::new(index + 1), nodes))
            .collect();
        self.nodes.insert(period, zones);
        self.cut_lines.insert(period, heuristic.cut_lines());
        self.summaries.insert(period, heuristic.summary());
    }

    /// Periods with a result, ascending.
    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Zone → nodes map of the flexible area.
    pub fn nodes(&self, period: Period) -> Option<&BTreeMap<ZoneId, BTreeSet<NodeId>>> {
        self.nodes.get(&period)
    }

    /// Lines between zones, in the order the splits cut them.
    pub fn cut_lines(&self, period: Period) -> Option<&[LineId]> {
        self.cut_lines.get(&period).map(Vec::as_slice)
    }

    pub fn summary(&self, period: Period) -> Option<&PartitionSummary> {
        self.summaries.get(&period)
    }

    pub fn zone_count(&self, period: Period) -> usize {
        self.nodes.get(&period).map_or(0, BTreeMap::len)
    }

    /// Flexible zone containing `node`.
    pub fn zone_of(&self, period: Period, node: NodeId) -> Option<ZoneId> {
        self.nodes
            .get(&period)?
            .iter()
            .find(|(_, nodes)| nodes.contains(&node))
            .map(|(&zone, _)| zone)
    }

    /// Whether both ends of `line` sit in the same zone. Nodes outside the
    /// flexible area are zones of their own. `None` for an unknown period.
    pub fn is_intra_zonal(&self, period: Period, line: &GridLine) -> Option<bool> {
        if !self.nodes.contains_key(&period) {
            return None;
        }
        let intra = match (self.zone_of(period, line.from), self.zone_of(period, line.to)) {
            (Some(a), Some(b)) => a == b,
            (None, None) => line.from == line.to,
            _ => false,
        };
        Some(intra)
    }

    /// Zone map extended to the whole grid: each node outside the flexible
    /// area becomes a single-node zone, numbered after the flexible zones in
    /// ascending node id order.
    pub fn zone_map_with_fixed_nodes(
        &self,
        period: Period,
        grid: &Grid,
    ) -> Option<BTreeMap<ZoneId, BTreeSet<NodeId>>> {
        let mut map = self.nodes.get(&period)?.clone();
        let mut next = map.len() + 1;
        for node in grid.fixed_nodes() {
            map.insert(ZoneId::new(next), BTreeSet::from([node.id]));
            next += 1;
        }
        Some(map)
    }
}
