//! Congestion-targeted zone partitioning driver.
//!
//! The heuristic starts with a single zone (id 1) holding the whole flexible
//! area and runs at most `n_zones - 1` iterations. Iteration `i` picks, among
//! the active zones that contain congestion and at least `2 * min_nodes`
//! nodes, the one whose best [`targeted_partition`] removes the most
//! congestion, and replaces it with children `2i` and `2i + 1`.
//!
//! | Outcome | Condition |
//! |---------|-----------|
//! | [`Termination::Complete`] | `n_zones - 1` splits applied |
//! | [`Termination::ZeroZones`] | no congestion at all |
//! | [`Termination::StoppedTooSmall`] | congestion left only in small zones |
//! | [`Termination::StoppedAllCut`] | all congestion lies on zone borders |
//! | [`Termination::StoppedInfeasible`] | no candidate had a feasible cut |
//!
//! Every outcome leaves a consistent zone set. After each split the active
//! zones are checked to be disjoint and to cover the flexible area; a
//! violation is the only error the driver returns once running.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use flexzone_core::{LineId, Megawatts, NodeId, Period, ZoneId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::congestion::{CongestedLine, CongestionNetwork};
use super::events::{ZoningEvent, ZoningObserver};
use super::graph::ZoneGraph;
use super::targeted::{targeted_partition, ZoneSplit};
use crate::config::ZoningParams;
use crate::error::{Result, ZoningError};

/// Why the heuristic stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Termination {
    Complete,
    ZeroZones,
    StoppedTooSmall,
    StoppedAllCut,
    StoppedInfeasible,
}

impl Termination {
    /// Whether the run stopped before reaching the requested zone count.
    pub fn is_early(&self) -> bool {
        !matches!(self, Termination::Complete)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Complete => write!(f, "requested number of zones reached"),
            Termination::ZeroZones => write!(f, "no congestion, no zones created"),
            Termination::StoppedTooSmall => {
                write!(f, "congestion only within zones too small to divide")
            }
            Termination::StoppedAllCut => {
                write!(f, "all congestion cut away by zone borders")
            }
            Termination::StoppedInfeasible => write!(f, "no feasible split found"),
        }
    }
}

/// A zone created at some point of the run.
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    pub id: ZoneId,
    /// Subgraph induced by the zone's nodes
    pub graph: ZoneGraph,
    /// Congested lines with both endpoints inside the zone
    pub congested: Vec<CongestedLine>,
}

impl ZoneRecord {
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.graph.node_set()
    }

    pub fn is_congested(&self) -> bool {
        !self.congested.is_empty()
    }
}

/// One applied split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub split_zone: ZoneId,
    pub children: (ZoneId, ZoneId),
    /// Congested line the winning cut was aimed at
    pub anchor: LineId,
    /// Lines between the two children, by line id
    pub cut_lines: Vec<LineId>,
    pub cut_value: Megawatts,
    /// Congested lines among `cut_lines`
    pub congested_cut: usize,
}

/// Outcome of partitioning one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub period: Period,
    pub zones: usize,
    pub congested_total: usize,
    pub congested_cut: usize,
    pub partition_value: Megawatts,
    pub termination: Termination,
    pub iterations: usize,
}

impl fmt::Display for PartitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Split area into {} zones, where {} of {} congested lines were cut",
            self.zones, self.congested_cut, self.congested_total
        )
    }
}

/// State of one period's partitioning run.
#[derive(Debug, Clone)]
pub struct Heuristic {
    period: Period,
    params: ZoningParams,
    flex_nodes: BTreeSet<NodeId>,
    congested_total: usize,
    /// Every zone ever created, keyed by id
    zones: BTreeMap<ZoneId, ZoneRecord>,
    /// Active zone ids after each iteration; entry 0 is the initial state
    active: Vec<Vec<ZoneId>>,
    iterations: Vec<IterationRecord>,
    partition_value: Megawatts,
    termination: Termination,
}

impl Heuristic {
    /// Partition `network` into at most `params.n_zones` zones.
    pub fn run(
        network: CongestionNetwork,
        params: &ZoningParams,
        observer: &dyn ZoningObserver,
    ) -> Result<Self> {
        params.validate()?;

        let CongestionNetwork {
            period,
            graph,
            congested,
        } = network;
        let root = ZoneId::new(1);
        let mut heuristic = Self {
            period,
            params: params.clone(),
            flex_nodes: graph.node_set(),
            congested_total: congested.len(),
            zones: BTreeMap::new(),
            active: vec![vec![root]],
            iterations: Vec::new(),
            partition_value: Megawatts(0.0),
            termination: Termination::Complete,
        };
        heuristic.zones.insert(
            root,
            ZoneRecord {
                id: root,
                graph,
                congested,
            },
        );

        observer.on_event(&ZoningEvent::PartitioningStarted {
            period,
            nodes: heuristic.flex_nodes.len(),
            congested_lines: heuristic.congested_total,
            n_zones: params.n_zones,
            min_nodes: params.min_nodes,
        });

        heuristic.termination = heuristic.iterate(observer)?;
        debug!(
            period = period.value(),
            termination = ?heuristic.termination,
            zones = heuristic.zone_count(),
            "heuristic finished"
        );
        observer.on_event(&ZoningEvent::Terminated {
            period,
            termination: heuristic.termination,
            zones: heuristic.zone_count(),
        });
        Ok(heuristic)
    }

    /// Splits are accepted at any value, including 0: a zone that is already
    /// disconnected is split along its islands without cutting a line.
    fn iterate(&mut self, observer: &dyn ZoningObserver) -> Result<Termination> {
        let min_nodes = self.params.min_nodes;

        for i in 1..self.params.n_zones {
            let mut candidates = Vec::new();
            let mut congestion_left = false;
            for &id in self.active_zones() {
                let zone = self.zone_checked(id, i)?;
                if !zone.is_congested() {
                    continue;
                }
                if zone.size() / 2 >= min_nodes {
                    candidates.push(id);
                } else {
                    congestion_left = true;
                }
            }

            if candidates.is_empty() {
                return Ok(if congestion_left {
                    Termination::StoppedTooSmall
                } else if i == 1 {
                    Termination::ZeroZones
                } else {
                    Termination::StoppedAllCut
                });
            }

            observer.on_event(&ZoningEvent::IterationStarted {
                period: self.period,
                iteration: i,
                candidates: candidates.clone(),
            });

            let mut best: Option<(ZoneId, ZoneSplit)> = None;
            for &id in &candidates {
                let zone = self.zone_checked(id, i)?;
                let split = targeted_partition(&zone.graph, min_nodes, &zone.congested);
                observer.on_event(&ZoningEvent::CandidateEvaluated {
                    period: self.period,
                    iteration: i,
                    zone: id,
                    value: split.as_ref().map(|s| s.value),
                });
                if let Some(split) = split {
                    let better = best
                        .as_ref()
                        .map_or(true, |(_, current)| split.value >= current.value);
                    if better {
                        best = Some((id, split));
                    }
                }
            }

            let Some((zone, split)) = best else {
                return Ok(Termination::StoppedInfeasible);
            };
            self.commit(i, zone, split, observer)?;
        }

        Ok(Termination::Complete)
    }

    /// Replace `parent` with children `2i` and `2i + 1`.
    fn commit(
        &mut self,
        i: usize,
        parent: ZoneId,
        split: ZoneSplit,
        observer: &dyn ZoningObserver,
    ) -> Result<()> {
        let children = (ZoneId::new(2 * i), ZoneId::new(2 * i + 1));
        let parent_zone = self.zone_checked(parent, i)?;

        let child = |id: ZoneId, nodes: &BTreeSet<NodeId>| ZoneRecord {
            id,
            graph: parent_zone.graph.induced(nodes),
            congested: parent_zone
                .congested
                .iter()
                .filter(|line| line.within(nodes))
                .copied()
                .collect(),
        };
        let first = child(children.0, &split.first);
        let second = child(children.1, &split.second);

        let record = IterationRecord {
            iteration: i,
            split_zone: parent,
            children,
            anchor: split.anchor,
            cut_lines: split.cut_lines(),
            cut_value: split.value,
            congested_cut: split.congested_cut(),
        };

        let mut next: Vec<ZoneId> = self
            .active_zones()
            .iter()
            .copied()
            .filter(|&id| id != parent)
            .collect();
        next.extend([children.0, children.1]);

        self.zones.insert(children.0, first);
        self.zones.insert(children.1, second);
        self.active.push(next);
        self.partition_value = self.partition_value + split.value;

        observer.on_event(&ZoningEvent::SplitApplied {
            period: self.period,
            iteration: i,
            zone: parent,
            children,
            cut_lines: record.cut_lines.clone(),
            value: record.cut_value,
        });
        self.iterations.push(record);

        self.check_partition(i)
    }

    /// Active zones must be pairwise disjoint and cover the flexible area.
    fn check_partition(&self, iteration: usize) -> Result<()> {
        let mut seen: BTreeMap<NodeId, ZoneId> = BTreeMap::new();
        for &id in self.active_zones() {
            let zone = self.zone_checked(id, iteration)?;
            for node in zone.graph.node_ids() {
                if let Some(other) = seen.insert(node, id) {
                    return Err(self.violation(
                        iteration,
                        format!(
                            "node {} in zones {} and {}",
                            node.value(),
                            other.value(),
                            id.value()
                        ),
                    ));
                }
            }
        }
        if let Some(missing) = self.flex_nodes.iter().find(|n| !seen.contains_key(*n)) {
            return Err(self.violation(
                iteration,
                format!("node {} not in any active zone", missing.value()),
            ));
        }
        if seen.len() != self.flex_nodes.len() {
            return Err(self.violation(iteration, "active zones hold unknown nodes".to_string()));
        }
        Ok(())
    }

    fn zone_checked(&self, id: ZoneId, iteration: usize) -> Result<&ZoneRecord> {
        self.zones
            .get(&id)
            .ok_or_else(|| self.violation(iteration, format!("zone {} is not registered", id.value())))
    }

    fn violation(&self, iteration: usize, detail: String) -> ZoningError {
        ZoningError::InvariantViolation {
            period: self.period,
            iteration,
            detail,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn params(&self) -> &ZoningParams {
        &self.params
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn iterations(&self) -> &[IterationRecord] {
        &self.iterations
    }

    /// Active zone ids at the end of the run, in creation order.
    pub fn active_zones(&self) -> &[ZoneId] {
        self.active.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Active zone ids after `iteration` (0 is the initial single zone).
    pub fn active_after(&self, iteration: usize) -> Option<&[ZoneId]> {
        self.active.get(iteration).map(Vec::as_slice)
    }

    /// Any zone created during the run, active or not.
    pub fn zone(&self, id: ZoneId) -> Option<&ZoneRecord> {
        self.zones.get(&id)
    }

    pub fn zone_count(&self) -> usize {
        self.active_zones().len()
    }

    /// Node sets of the active zones, in active-list order.
    pub fn final_zones(&self) -> Vec<(ZoneId, BTreeSet<NodeId>)> {
        self.active_zones()
            .iter()
            .filter_map(|&id| self.zones.get(&id).map(|zone| (id, zone.nodes())))
            .collect()
    }

    /// Lines cut over the whole run, in iteration order.
    pub fn cut_lines(&self) -> Vec<LineId> {
        self.iterations
            .iter()
            .flat_map(|record| record.cut_lines.iter().copied())
            .collect()
    }

    /// Congestion removed by all splits together.
    pub fn partition_value(&self) -> Megawatts {
        self.partition_value
    }

    pub fn congested_total(&self) -> usize {
        self.congested_total
    }

    /// Congested lines that now lie between zones.
    pub fn congested_cut(&self) -> usize {
        let remaining: usize = self
            .active_zones()
            .iter()
            .filter_map(|id| self.zones.get(id))
            .map(|zone| zone.congested.len())
            .sum();
        self.congested_total.saturating_sub(remaining)
    }

    pub fn summary(&self) -> PartitionSummary {
        PartitionSummary {
            period: self.period,
            zones: self.zone_count(),
            congested_total: self.congested_total,
            congested_cut: self.congested_cut(),
            partition_value: self.partition_value,
            termination: self.termination,
            iterations: self.iterations.len(),
        }
    }
}
