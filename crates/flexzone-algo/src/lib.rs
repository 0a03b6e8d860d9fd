//! # flexzone-algo: Zone Partitioning for Flexibility Markets
//!
//! Splits the flexible area of a transmission grid into a bounded number of
//! zones so that congested lines end up on zone borders, while every zone
//! keeps a minimum number of nodes. One run per period; the resulting
//! [`Zones`] hold the zone → nodes map and the cut lines that zonal market
//! clearing works with.
//!
//! ## Pipeline
//!
//! | Stage | Entry point |
//! |-------|-------------|
//! | Congestion graph | [`build_congestion_graph`] |
//! | Split driver | [`Heuristic::run`] |
//! | Best cut of a zone | [`zoning::targeted_partition()`] |
//! | Anchor-to-anchor cut | [`zoning::cut_line()`] |
//! | Bisection | [`zoning::find_partitions()`] |
//! | Many periods | [`partition_periods`] |
//!
//! ## Example
//!
//! ```
//! use flexzone_algo::test_utils::{flows_with, ring_grid};
//! use flexzone_algo::{partition_period, NoopObserver, Termination, ZoningParams};
//! use flexzone_core::Period;
//!
//! let grid = ring_grid(6, 100.0);
//! let flows = flows_with(&grid, &[(3, 105.0)]);
//! let params = ZoningParams { n_zones: 2, min_nodes: 2 };
//!
//! let run = partition_period(&grid, &flows, Period::new(0), &params, &NoopObserver).unwrap();
//! assert_eq!(run.termination(), Termination::Complete);
//! assert_eq!(run.zone_count(), 2);
//! println!("{}", run.summary());
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): partition periods on a rayon thread pool

pub mod config;
pub mod error;
pub mod runner;
pub mod test_utils;
pub mod zoning;

pub use config::{FlexZoneConfig, RunnerConfig, ZoningParams};
pub use error::{Result, ZoningError};
pub use runner::{partition_period, partition_periods};
pub use zoning::{
    build_congestion_graph, CongestedLine, CongestionNetwork, Heuristic, IterationRecord,
    NoopObserver, PartitionSummary, RecordingObserver, Termination, TracingObserver,
    ZoningEvent, ZoningObserver, Zones,
};
