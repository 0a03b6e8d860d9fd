//! End-to-end partitioning scenarios.

use std::collections::BTreeSet;

use flexzone_algo::test_utils::{flows_with, ladder_grid, path_grid, ring_grid};
use flexzone_algo::{
    partition_period, partition_periods, FlexZoneConfig, Heuristic, NoopObserver, Termination,
    ZoningError, ZoningParams,
};
use flexzone_core::{
    FlowSeries, Grid, GridLine, GridNode, LineFlows, LineId, Megawatts, NodeId, Period, ZoneId,
};

fn params(n_zones: usize, min_nodes: usize) -> ZoningParams {
    ZoningParams { n_zones, min_nodes }
}

fn set(ids: &[usize]) -> BTreeSet<NodeId> {
    ids.iter().copied().map(NodeId::new).collect()
}

fn ladder_flows(grid: &Grid) -> LineFlows {
    // rail A 3-4, rail B 8-9 and rung 2-7 overloaded
    flows_with(grid, &[(3, 30.0), (7, -25.0), (10, 22.0)])
}

/// Active zones after every iteration are disjoint and cover the flexible area.
fn assert_partition_invariant(grid: &Grid, h: &Heuristic) {
    let flex = grid.flex_node_ids();
    for iteration in 0..=h.iterations().len() {
        let active = h.active_after(iteration).unwrap();
        let mut seen = BTreeSet::new();
        for id in active {
            for node in h.zone(*id).unwrap().nodes() {
                assert!(seen.insert(node), "node {node} twice after iteration {iteration}");
            }
        }
        assert_eq!(seen, flex, "coverage after iteration {iteration}");
    }
}

#[test]
fn ring_with_one_congested_line() {
    let grid = ring_grid(6, 100.0);
    let flows = flows_with(&grid, &[(3, 105.0)]);
    let h = partition_period(&grid, &flows, Period::new(0), &params(2, 2), &NoopObserver).unwrap();

    assert_eq!(h.termination(), Termination::Complete);
    assert_eq!(h.zone_count(), 2);
    let zones = h.final_zones();
    assert_eq!(zones[0], (ZoneId::new(2), set(&[1, 2, 3])));
    assert_eq!(zones[1], (ZoneId::new(3), set(&[4, 5, 6])));
    assert_eq!(h.cut_lines(), vec![LineId::new(3), LineId::new(6)]);
    assert!((h.iterations()[0].cut_value.value() - 5.0).abs() < 1e-9);
}

#[test]
fn no_congestion_gives_single_zone() {
    let grid = ladder_grid(5, 10.0);
    let flows = flows_with(&grid, &[(3, 9.0), (4, -10.0)]);
    let h = partition_period(&grid, &flows, Period::new(0), &params(5, 2), &NoopObserver).unwrap();

    assert_eq!(h.termination(), Termination::ZeroZones);
    assert!(h.iterations().is_empty());
    assert_eq!(h.final_zones(), vec![(ZoneId::new(1), grid.flex_node_ids())]);
    assert!(h.cut_lines().is_empty());
}

#[test]
fn oversized_min_nodes() {
    let grid = ring_grid(6, 100.0);
    let flows = flows_with(&grid, &[(3, 105.0)]);
    let h = partition_period(&grid, &flows, Period::new(0), &params(3, 4), &NoopObserver).unwrap();
    assert_eq!(h.termination(), Termination::StoppedTooSmall);
    assert_eq!(h.zone_count(), 1);

    // Large enough to try, but a leaf line can never leave two sides of 2.
    let grid = path_grid(5, 100.0);
    let flows = flows_with(&grid, &[(1, 150.0)]);
    let h = partition_period(&grid, &flows, Period::new(0), &params(3, 2), &NoopObserver).unwrap();
    assert_eq!(h.termination(), Termination::StoppedInfeasible);
    assert_eq!(h.zone_count(), 1);
    assert_eq!(h.summary().congested_cut, 0);
}

#[test]
fn ladder_invariants_hold_every_iteration() {
    let grid = ladder_grid(5, 10.0);
    let flows = ladder_flows(&grid);
    let h = partition_period(&grid, &flows, Period::new(0), &params(4, 2), &NoopObserver).unwrap();

    assert!(!h.iterations().is_empty());
    assert_partition_invariant(&grid, &h);

    for record in h.iterations() {
        let i = record.iteration;
        assert_eq!(record.children, (ZoneId::new(2 * i), ZoneId::new(2 * i + 1)));

        let first = h.zone(record.children.0).unwrap().nodes();
        let second = h.zone(record.children.1).unwrap().nodes();
        let mut expected = Megawatts(0.0);
        for &line_id in &record.cut_lines {
            let line = grid.line(line_id).unwrap();
            let across = (first.contains(&line.from) && second.contains(&line.to))
                || (first.contains(&line.to) && second.contains(&line.from));
            assert!(across, "{line_id} does not join the two children");
            expected = expected + line.congestion(flows.get(line_id).unwrap());
        }
        assert!((record.cut_value.value() - expected.value()).abs() < 1e-9);
        assert!(first.len() >= 2 && second.len() >= 2);
    }

    // Every line between final zones was cut exactly once.
    let cut: Vec<LineId> = h.cut_lines();
    let unique: BTreeSet<LineId> = cut.iter().copied().collect();
    assert_eq!(unique.len(), cut.len());
    let zone_of = |node: NodeId| {
        h.final_zones()
            .into_iter()
            .find(|(_, nodes)| nodes.contains(&node))
            .map(|(id, _)| id)
    };
    let between: BTreeSet<LineId> = grid
        .flex_lines()
        .filter(|line| zone_of(line.from) != zone_of(line.to))
        .map(|line| line.id)
        .collect();
    assert_eq!(unique, between);
}

#[test]
fn repeated_runs_are_identical() {
    let grid = ladder_grid(6, 10.0);
    let series: FlowSeries = (0..4)
        .map(|t| {
            let flow = 12.0 + t as f64;
            (Period::new(t), flows_with(&grid, &[(2, flow), (9, -flow), (14, 20.0)]))
        })
        .collect();
    let mut config = FlexZoneConfig::default();
    config.zoning = params(4, 2);
    config.runner.parallel = false;

    let first = partition_periods(&grid, &series, &config, &NoopObserver).unwrap();
    let second = partition_periods(&grid, &series, &config, &NoopObserver).unwrap();
    assert_eq!(first, second);

    config.runner.parallel = true;
    let parallel = partition_periods(&grid, &series, &config, &NoopObserver).unwrap();
    assert_eq!(first, parallel);
}

#[test]
fn disconnected_flex_area_splits_at_zero_value() {
    let mut grid = Grid::new();
    for i in 1..=6 {
        grid.add_node(GridNode::flex(NodeId::new(i), format!("N{i}"))).unwrap();
    }
    for (id, from, to) in [(1, 1, 2), (2, 2, 3), (3, 3, 4), (4, 4, 1), (5, 5, 6)] {
        grid.add_line(GridLine::new(
            LineId::new(id),
            NodeId::new(from),
            NodeId::new(to),
            Megawatts(10.0),
        ))
        .unwrap();
    }
    let flows = flows_with(&grid, &[(1, 11.0)]);
    let h = partition_period(&grid, &flows, Period::new(0), &params(2, 2), &NoopObserver).unwrap();

    assert_eq!(h.termination(), Termination::Complete);
    let zones: Vec<BTreeSet<NodeId>> = h.final_zones().into_iter().map(|(_, n)| n).collect();
    assert_eq!(zones, vec![set(&[1, 2, 3, 4]), set(&[5, 6])]);
    assert!(h.cut_lines().is_empty());
    assert_eq!(h.partition_value(), Megawatts(0.0));
    assert_eq!(
        h.summary().to_string(),
        "Split area into 2 zones, where 0 of 1 congested lines were cut"
    );
}

#[test]
fn fixed_nodes_stay_out_of_partitioning() {
    let mut grid = ring_grid(6, 100.0);
    grid.add_node(GridNode::fixed(NodeId::new(50), "import")).unwrap();
    grid.add_line(
        GridLine::new(LineId::new(50), NodeId::new(1), NodeId::new(50), Megawatts(1.0)).as_fixed(),
    )
    .unwrap();
    let series: FlowSeries = [(Period::new(0), flows_with(&grid, &[(3, 105.0), (50, 9.0)]))]
        .into_iter()
        .collect();
    let mut config = FlexZoneConfig::default();
    config.zoning = params(2, 2);

    let zones = partition_periods(&grid, &series, &config, &NoopObserver).unwrap();
    let t = Period::new(0);
    assert_eq!(zones.zone_count(t), 2);
    assert_eq!(zones.zone_of(t, NodeId::new(50)), None);

    let full = zones.zone_map_with_fixed_nodes(t, &grid).unwrap();
    assert_eq!(full[&ZoneId::new(3)], set(&[50]));
    let import = grid.line(LineId::new(50)).unwrap();
    assert_eq!(zones.is_intra_zonal(t, import), Some(false));
}

#[test]
fn flexible_line_into_fixed_node_is_rejected() {
    let mut grid = ring_grid(4, 100.0);
    grid.add_node(GridNode::fixed(NodeId::new(9), "ext")).unwrap();
    grid.add_line(GridLine::new(
        LineId::new(9),
        NodeId::new(2),
        NodeId::new(9),
        Megawatts(5.0),
    ))
    .unwrap();
    let flows = flows_with(&grid, &[]);
    let err =
        partition_period(&grid, &flows, Period::new(0), &params(2, 2), &NoopObserver).unwrap_err();
    assert!(matches!(err, ZoningError::DanglingLine { .. }));
}
