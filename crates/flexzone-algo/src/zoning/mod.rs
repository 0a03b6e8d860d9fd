//! Congestion-targeted zone partitioning.
//!
//! The layers, innermost first:
//!
//! - [`find_partitions()`]: bisect a graph that is already disconnected
//! - [`cut_line()`]: remove path edges between two anchors until the graph
//!   falls apart, with one-step backtracking on undersized sides
//! - [`targeted_partition`]: best cut of one zone over all its congested lines
//! - [`Heuristic`]: split the most valuable zone until the zone budget or a
//!   stopping condition is reached
//! - [`Zones`]: final per-period zone maps and cut lines
//!
//! All searches visit nodes in ascending [`NodeId`](flexzone_core::NodeId)
//! order, so identical inputs give identical zones.

pub mod congestion;
pub mod cut_line;
pub mod events;
pub mod find_partitions;
pub mod graph;
pub mod heuristic;
pub mod targeted;
pub mod zones;

pub use congestion::{build_congestion_graph, CongestedLine, CongestionNetwork};
pub use cut_line::{cut_line, CutOutcome};
pub use events::{NoopObserver, RecordingObserver, TracingObserver, ZoningEvent, ZoningObserver};
pub use find_partitions::{find_partitions, Anchor, Bisection, PartitionOutcome};
pub use graph::{LineEdge, ZoneGraph};
pub use heuristic::{Heuristic, IterationRecord, PartitionSummary, Termination, ZoneRecord};
pub use targeted::{cut_value, targeted_partition, ZoneSplit};
pub use zones::Zones;
