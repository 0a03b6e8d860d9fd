//! Partitioning over many periods.
//!
//! Periods share the read-only grid and nothing else, so with the
//! `parallel` feature they run on a dedicated rayon pool. Results are
//! collected in period order either way.

use flexzone_core::{flex_area_stats, Diagnostics, FlowSeries, Grid, LineFlows, Period};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::config::{FlexZoneConfig, ZoningParams};
use crate::error::Result;
#[cfg(feature = "parallel")]
use crate::error::ZoningError;
use crate::zoning::{build_congestion_graph, Heuristic, ZoningObserver, Zones};

/// Build the congestion graph for one period and partition it.
pub fn partition_period(
    grid: &Grid,
    flows: &LineFlows,
    period: Period,
    params: &ZoningParams,
    observer: &dyn ZoningObserver,
) -> Result<Heuristic> {
    let network = build_congestion_graph(grid, flows, period)?;
    let heuristic = Heuristic::run(network, params, observer)?;
    info!(period = period.value(), "{}", heuristic.summary());
    Ok(heuristic)
}

/// Partition every period of `series` and collect the final zones.
///
/// Fails on the first period with bad input; no partial result is returned.
pub fn partition_periods(
    grid: &Grid,
    series: &FlowSeries,
    config: &FlexZoneConfig,
    observer: &dyn ZoningObserver,
) -> Result<Zones> {
    config.validate()?;
    log_grid_overview(grid);

    let periods: Vec<(Period, &LineFlows)> = series.iter().collect();
    let run = |&(period, flows): &(Period, &LineFlows)| {
        partition_period(grid, flows, period, &config.zoning, observer)
    };

    let heuristics: Vec<Heuristic> = if config.runner.parallel && periods.len() > 1 {
        run_parallel(&periods, config.runner.worker_threads, run)?
    } else {
        periods.iter().map(run).collect::<Result<_>>()?
    };

    let mut zones = Zones::new();
    for heuristic in &heuristics {
        zones.extract(heuristic);
    }
    Ok(zones)
}

/// Report the flexible area and grid problems up front. Hard defects still
/// fail the period that trips over them.
fn log_grid_overview(grid: &Grid) {
    let stats = flex_area_stats(grid);
    info!(
        nodes = stats.node_count,
        lines = stats.edge_count,
        components = stats.connected_components,
        min_degree = stats.min_degree,
        max_degree = stats.max_degree,
        avg_degree = stats.avg_degree,
        density = stats.density,
        "flexible area"
    );

    let mut diag = Diagnostics::new();
    grid.validate_into(&mut diag);
    for issue in diag.errors().chain(diag.warnings()) {
        warn!(%issue, "grid validation");
    }
    if diag.has_errors() || diag.has_warnings() {
        debug!("{}", diag.summary());
    }
}

#[cfg(feature = "parallel")]
fn run_parallel<'a, F>(
    periods: &[(Period, &'a LineFlows)],
    worker_threads: usize,
    run: F,
) -> Result<Vec<Heuristic>>
where
    F: Fn(&(Period, &'a LineFlows)) -> Result<Heuristic> + Sync + Send,
{
    // 0 lets rayon pick the thread count
    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .build()
        .map_err(|e| ZoningError::ThreadPool(e.to_string()))?;
    debug!(
        periods = periods.len(),
        threads = pool.current_num_threads(),
        "partitioning periods in parallel"
    );
    pool.install(|| periods.par_iter().map(run).collect())
}

#[cfg(not(feature = "parallel"))]
fn run_parallel<'a, F>(
    periods: &[(Period, &'a LineFlows)],
    _worker_threads: usize,
    run: F,
) -> Result<Vec<Heuristic>>
where
    F: Fn(&(Period, &'a LineFlows)) -> Result<Heuristic>,
{
    debug!(
        periods = periods.len(),
        "built without the parallel feature, running periods sequentially"
    );
    periods.iter().map(run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{flows_with, ring_grid};
    use crate::zoning::{NoopObserver, RecordingObserver, Termination, ZoningEvent};
    use flexzone_core::{LineId, NodeId, ZoneId};

    fn series(grid: &Grid) -> FlowSeries {
        [
            (Period::new(0), flows_with(grid, &[])),
            (Period::new(1), flows_with(grid, &[(3, 105.0)])),
            (Period::new(2), flows_with(grid, &[(1, -120.0)])),
        ]
        .into_iter()
        .collect()
    }

    fn config(parallel: bool) -> FlexZoneConfig {
        let mut config = FlexZoneConfig::default();
        config.zoning = ZoningParams {
            n_zones: 2,
            min_nodes: 2,
        };
        config.runner.parallel = parallel;
        config.runner.worker_threads = 2;
        config
    }

    #[test]
    fn test_partition_period() {
        let grid = ring_grid(6, 100.0);
        let flows = flows_with(&grid, &[(3, 105.0)]);
        let params = ZoningParams {
            n_zones: 2,
            min_nodes: 2,
        };
        let h = partition_period(&grid, &flows, Period::new(9), &params, &NoopObserver).unwrap();
        assert_eq!(h.period(), Period::new(9));
        assert_eq!(h.termination(), Termination::Complete);
        assert_eq!(h.cut_lines(), vec![LineId::new(3), LineId::new(6)]);
    }

    #[test]
    fn test_each_period_partitioned() {
        let grid = ring_grid(6, 100.0);
        let zones = partition_periods(&grid, &series(&grid), &config(false), &NoopObserver).unwrap();

        assert_eq!(zones.len(), 3);
        assert_eq!(zones.zone_count(Period::new(0)), 1);
        assert_eq!(
            zones.summary(Period::new(0)).unwrap().termination,
            Termination::ZeroZones
        );
        assert_eq!(zones.zone_count(Period::new(1)), 2);
        assert_eq!(zones.zone_count(Period::new(2)), 2);
        assert_ne!(
            zones.zone_of(Period::new(2), NodeId::new(1)),
            zones.zone_of(Period::new(2), NodeId::new(2))
        );
        assert_eq!(zones.zone_of(Period::new(1), NodeId::new(1)), Some(ZoneId::new(1)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = ring_grid(6, 100.0);
        let flows = series(&grid);
        let sequential = partition_periods(&grid, &flows, &config(false), &NoopObserver).unwrap();
        let parallel = partition_periods(&grid, &flows, &config(true), &NoopObserver).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_observer_shared_across_periods() {
        let grid = ring_grid(6, 100.0);
        let observer = RecordingObserver::new();
        partition_periods(&grid, &series(&grid), &config(true), &observer).unwrap();
        let finished = observer
            .events()
            .iter()
            .filter(|e| matches!(e, ZoningEvent::Terminated { .. }))
            .count();
        assert_eq!(finished, 3);
    }

    #[test]
    fn test_bad_period_fails_whole_run() {
        let grid = ring_grid(6, 100.0);
        let mut flows = series(&grid);
        flows.insert(Period::new(3), LineFlows::new());
        assert!(partition_periods(&grid, &flows, &config(false), &NoopObserver).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let grid = ring_grid(6, 100.0);
        let mut config = config(false);
        config.zoning.n_zones = 0;
        assert!(partition_periods(&grid, &series(&grid), &config, &NoopObserver).is_err());
    }
}
