#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path extraction and waypoint reduction.
//!
//! The walk starts at the spawn and repeatedly steps to the first unvisited
//! path or goal neighbour in [`NEIGHBOR_OFFSETS`] order (up, down, left,
//! right). Maps produced by the generator contain a single non-branching
//! chain, so the neighbour order only matters for hand-authored grids.

use bastion_core::{CellCoord, CellKind, MapConfig, NEIGHBOR_OFFSETS};
use glam::Vec2;

/// Ordered cells from the spawn to the end of the path.
///
/// Returns an empty list when the map has no spawn.
#[must_use]
pub fn extract_path(map: &MapConfig) -> Vec<CellCoord> {
    let Some(spawn) = map.first(CellKind::Spawn) else {
        return Vec::new();
    };

    let cols = map.cols() as usize;
    let mut visited = vec![false; map.rows() as usize * cols];
    let index = |cell: CellCoord| cell.row() as usize * cols + cell.column() as usize;

    visited[index(spawn)] = true;
    let mut path = vec![spawn];
    let mut current = spawn;

    loop {
        let next = NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|(row_delta, column_delta)| current.offset(*row_delta, *column_delta))
            .find(|candidate| {
                matches!(
                    map.cell(*candidate),
                    Some(CellKind::Path | CellKind::Goal)
                ) && !visited[index(*candidate)]
            });

        let Some(next) = next else {
            break;
        };
        visited[index(next)] = true;
        path.push(next);
        current = next;
    }

    path
}

/// Reduces an ordered path to its endpoints and direction-change corners.
///
/// Paths with two or fewer cells are returned unchanged.
#[must_use]
pub fn reduce_to_waypoints(path: &[CellCoord]) -> Vec<CellCoord> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let direction = |from: CellCoord, to: CellCoord| {
        (
            i64::from(to.row()) - i64::from(from.row()),
            i64::from(to.column()) - i64::from(from.column()),
        )
    };

    let mut waypoints = vec![path[0]];
    waypoints.extend(
        path.windows(3)
            .filter(|window| direction(window[0], window[1]) != direction(window[1], window[2]))
            .map(|window| window[1]),
    );
    waypoints.push(path[path.len() - 1]);
    waypoints
}

/// Centre of `cell` in world space, with the grid centred on the origin.
///
/// `x` grows with the column and `y` with the row.
#[must_use]
pub fn grid_to_world(map: &MapConfig, cell: CellCoord) -> Vec2 {
    let size = map.cell_size();
    let offset_x = (map.cols().saturating_sub(1)) as f32 * size / 2.0;
    let offset_y = (map.rows().saturating_sub(1)) as f32 * size / 2.0;
    Vec2::new(
        cell.column() as f32 * size - offset_x,
        cell.row() as f32 * size - offset_y,
    )
}

/// World-space waypoints enemies follow on `map`.
#[must_use]
pub fn world_waypoints(map: &MapConfig) -> Vec<Vec2> {
    reduce_to_waypoints(&extract_path(map))
        .into_iter()
        .map(|cell| grid_to_world(map, cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rows: &[&str]) -> MapConfig {
        let cells: Vec<Vec<CellKind>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        'S' => CellKind::Spawn,
                        'G' => CellKind::Goal,
                        'P' => CellKind::Path,
                        _ => CellKind::Buildable,
                    })
                    .collect()
            })
            .collect();
        MapConfig::from_rows(&cells).expect("rectangular rows")
    }

    #[test]
    fn straight_path_reduces_to_endpoints() {
        let map = parse(&["BBBB", "SPPG", "BBBB"]);
        let path = extract_path(&map);
        assert_eq!(path.len(), 4);
        assert_eq!(
            reduce_to_waypoints(&path),
            vec![CellCoord::new(0, 1), CellCoord::new(3, 1)]
        );
    }

    #[test]
    fn corners_are_kept() {
        let map = parse(&["SPB", "BPB", "BPG"]);
        let path = extract_path(&map);
        assert_eq!(
            path,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
                CellCoord::new(2, 2),
            ]
        );
        assert_eq!(
            reduce_to_waypoints(&path),
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 2),
                CellCoord::new(2, 2),
            ]
        );
    }

    #[test]
    fn short_paths_are_returned_unchanged() {
        let path = [CellCoord::new(0, 0), CellCoord::new(1, 0)];
        assert_eq!(reduce_to_waypoints(&path), path.to_vec());
        assert!(reduce_to_waypoints(&[]).is_empty());
    }

    #[test]
    fn missing_spawn_yields_empty_path() {
        let map = parse(&["BPG"]);
        assert!(extract_path(&map).is_empty());
        assert!(world_waypoints(&map).is_empty());
    }

    #[test]
    fn spawn_cells_are_not_walked_twice() {
        let map = parse(&["SS", "PG"]);
        let path = extract_path(&map);
        assert_eq!(path[0], CellCoord::new(0, 0));
        assert!(!path[1..].iter().any(|cell| *cell == CellCoord::new(1, 0)));
    }

    #[test]
    fn grid_is_centred_on_origin() {
        let map = MapConfig::filled(3, 5, CellKind::Buildable);
        assert_eq!(grid_to_world(&map, CellCoord::new(2, 1)), Vec2::ZERO);
        assert_eq!(grid_to_world(&map, CellCoord::new(0, 0)), Vec2::new(-2.0, -1.0));
        assert_eq!(grid_to_world(&map, CellCoord::new(4, 2)), Vec2::new(2.0, 1.0));
    }
}
