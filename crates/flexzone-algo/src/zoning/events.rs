//! Progress events emitted while partitioning.

use flexzone_core::{LineId, Megawatts, Period, ZoneId};
use parking_lot::Mutex;

use super::heuristic::Termination;

/// Events emitted by the heuristic as it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoningEvent {
    /// A period's flexible area is about to be partitioned.
    PartitioningStarted {
        period: Period,
        nodes: usize,
        congested_lines: usize,
        n_zones: usize,
        min_nodes: usize,
    },

    /// Iteration `iteration` found these splittable zones.
    IterationStarted {
        period: Period,
        iteration: usize,
        candidates: Vec<ZoneId>,
    },

    /// TargetedPartition finished for one candidate zone. `value` is `None`
    /// when no feasible cut exists.
    CandidateEvaluated {
        period: Period,
        iteration: usize,
        zone: ZoneId,
        value: Option<Megawatts>,
    },

    /// A zone was replaced by its two children.
    SplitApplied {
        period: Period,
        iteration: usize,
        zone: ZoneId,
        children: (ZoneId, ZoneId),
        cut_lines: Vec<LineId>,
        value: Megawatts,
    },

    /// The run ended.
    Terminated {
        period: Period,
        termination: Termination,
        zones: usize,
    },
}

impl ZoningEvent {
    pub fn period(&self) -> Period {
        match self {
            ZoningEvent::PartitioningStarted { period, .. }
            | ZoningEvent::IterationStarted { period, .. }
            | ZoningEvent::CandidateEvaluated { period, .. }
            | ZoningEvent::SplitApplied { period, .. }
            | ZoningEvent::Terminated { period, .. } => *period,
        }
    }
}

/// Sink for [`ZoningEvent`]s.
///
/// Shared across worker threads when periods run in parallel.
pub trait ZoningObserver: Send + Sync {
    fn on_event(&self, event: &ZoningEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ZoningObserver for NoopObserver {
    fn on_event(&self, _event: &ZoningEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ZoningObserver for TracingObserver {
    fn on_event(&self, event: &ZoningEvent) {
        match event {
            ZoningEvent::PartitioningStarted {
                period,
                nodes,
                congested_lines,
                n_zones,
                min_nodes,
            } => tracing::info!(
                period = period.value(),
                nodes,
                congested_lines,
                n_zones,
                min_nodes,
                "zone partitioning started"
            ),
            ZoningEvent::IterationStarted {
                period,
                iteration,
                candidates,
            } => tracing::debug!(
                period = period.value(),
                iteration,
                candidates = candidates.len(),
                "iteration started"
            ),
            ZoningEvent::CandidateEvaluated {
                period,
                iteration,
                zone,
                value,
            } => tracing::debug!(
                period = period.value(),
                iteration,
                zone = zone.value(),
                value = value.map(|v| v.value()),
                "candidate evaluated"
            ),
            ZoningEvent::SplitApplied {
                period,
                iteration,
                zone,
                children,
                cut_lines,
                value,
            } => tracing::info!(
                period = period.value(),
                iteration,
                zone = zone.value(),
                first = children.0.value(),
                second = children.1.value(),
                cut_lines = cut_lines.len(),
                value = value.value(),
                "split applied"
            ),
            ZoningEvent::Terminated {
                period,
                termination,
                zones,
            } => tracing::info!(
                period = period.value(),
                zones,
                %termination,
                "zone partitioning finished"
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ZoningEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<ZoningEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Events of one period, in emission order.
    pub fn for_period(&self, period: Period) -> Vec<ZoningEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.period() == period)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ZoningObserver for RecordingObserver {
    fn on_event(&self, event: &ZoningEvent) {
        self.events.lock().push(event.clone());
    }
}
