//! Small grids and flow builders shared by unit and integration tests.
//!
//! Builders panic on duplicate ids; they are fixtures, not input parsers.

use flexzone_core::{Grid, GridLine, GridNode, LineFlows, LineId, Megawatts, NodeId};

fn flex_nodes(grid: &mut Grid, ids: impl IntoIterator<Item = usize>) {
    for i in ids {
        grid.add_node(GridNode::flex(NodeId::new(i), format!("N{i}")))
            .expect("fresh node id");
    }
}

fn flex_line(grid: &mut Grid, id: usize, from: usize, to: usize, capacity: f64) {
    grid.add_line(GridLine::new(
        LineId::new(id),
        NodeId::new(from),
        NodeId::new(to),
        Megawatts(capacity),
    ))
    .expect("fresh line id between known nodes");
}

/// Ring of nodes `1..=n`; line `i` joins node `i` to node `i % n + 1`.
pub fn ring_grid(n: usize, capacity: f64) -> Grid {
    let mut grid = Grid::new();
    flex_nodes(&mut grid, 1..=n);
    for i in 1..=n {
        flex_line(&mut grid, i, i, i % n + 1, capacity);
    }
    grid
}

/// Path of nodes `1..=n`; line `i` joins node `i` to node `i + 1`.
pub fn path_grid(n: usize, capacity: f64) -> Grid {
    let mut grid = Grid::new();
    flex_nodes(&mut grid, 1..=n);
    for i in 1..n {
        flex_line(&mut grid, i, i, i + 1, capacity);
    }
    grid
}

/// Two rails of `rungs` nodes joined at every position.
///
/// Rail A holds nodes `1..=rungs`, rail B nodes `rungs+1..=2*rungs`.
/// Lines are numbered rail A first, then rail B, then the rungs from the
/// left end.
pub fn ladder_grid(rungs: usize, capacity: f64) -> Grid {
    let mut grid = Grid::new();
    flex_nodes(&mut grid, 1..=2 * rungs);
    let mut id = 1;
    for offset in [0, rungs] {
        for i in 1..rungs {
            flex_line(&mut grid, id, offset + i, offset + i + 1, capacity);
            id += 1;
        }
    }
    for i in 1..=rungs {
        flex_line(&mut grid, id, i, rungs + i, capacity);
        id += 1;
    }
    grid
}

/// Zero flow on every flexible line, except `(line id, flow)` overrides.
pub fn flows_with(grid: &Grid, overrides: &[(usize, f64)]) -> LineFlows {
    let mut flows: LineFlows = grid
        .flex_lines()
        .map(|line| (line.id, Megawatts(0.0)))
        .collect();
    for &(line, flow) in overrides {
        flows.insert(LineId::new(line), Megawatts(flow));
    }
    flows
}
