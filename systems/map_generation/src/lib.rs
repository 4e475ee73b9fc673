#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded procedural map generation.
//!
//! [`generate`] drives up to [`MAX_ATTEMPTS`] serpentine layouts from a single
//! [`Mulberry32`] stream. Each attempt alternates short horizontal runs with
//! long vertical runs that bounce between the top and bottom margins, then
//! connects to the goal row at the far column. Attempts that violate the
//! structural rules checked by [`validate`] are discarded. When every attempt
//! fails a fixed zig-zag layout is returned, so callers always receive a
//! usable map.

use std::collections::HashSet;

use bastion_core::{CellCoord, CellKind, MapConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, trace};

/// Number of random layouts attempted before falling back to the zig-zag.
pub const MAX_ATTEMPTS: usize = 30;
/// Minimum share of buildable cells a map must keep.
pub const MIN_BUILDABLE_RATIO: f64 = 0.3;
/// Smallest number of rows a generated map may have.
pub const MIN_ROWS: u32 = 3;
/// Smallest number of columns a generated map may have.
pub const MIN_COLS: u32 = 2;

const EDGE_MARGIN: i64 = 1;

/// Parameters describing a map to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MapRequest {
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub cols: u32,
    /// Minimum number of path cells, endpoints included.
    pub min_path_length: usize,
    /// Seed for the layout stream.
    pub seed: u32,
}

impl MapRequest {
    /// Generates the requested map.
    #[must_use]
    pub fn generate(&self) -> MapConfig {
        generate(self.rows, self.cols, self.min_path_length, self.seed)
    }
}

impl Default for MapRequest {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 12,
            min_path_length: 20,
            seed: 42,
        }
    }
}

/// Structural problems detected by [`validate`].
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MapDefect {
    /// The map does not contain exactly one spawn.
    #[error("expected exactly one spawn, found {0}")]
    SpawnCount(usize),
    /// The map does not contain exactly one goal.
    #[error("expected exactly one goal, found {0}")]
    GoalCount(usize),
    /// A path cell has the wrong number of path neighbours.
    #[error("cell {cell:?} has {found} path neighbours, expected {expected}")]
    Degree {
        /// Offending cell.
        cell: CellCoord,
        /// Number of in-grid path neighbours found.
        found: usize,
        /// Number of in-grid path neighbours required.
        expected: usize,
    },
    /// Too few cells remain buildable.
    #[error("buildable ratio {ratio:.3} is below the 0.3 minimum")]
    Crowded {
        /// Observed buildable ratio.
        ratio: f64,
    },
    /// The walk from the spawn does not cover every path cell or misses the goal.
    #[error("walk from spawn covers {walked} of {total} path cells")]
    Detached {
        /// Cells reached by the walk.
        walked: usize,
        /// Non-buildable cells on the map.
        total: usize,
    },
}

/// Seeded 32-bit multiply-xorshift generator.
///
/// Produces the same stream as the classic Mulberry32 routine, which keeps
/// generated layouts stable across platforms.
#[derive(Clone, Debug)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Next value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    pub fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min + 1) as f64;
        min + (self.next_unit() * span).floor() as i64
    }
}

/// Generates a map with a single-width path from the left edge to the right edge.
///
/// Never fails: dimensions below [`MIN_ROWS`] by [`MIN_COLS`] are raised to
/// those minimums, and the zig-zag fallback is used when no random attempt
/// passes validation.
#[must_use]
pub fn generate(rows: u32, cols: u32, min_path_length: usize, seed: u32) -> MapConfig {
    let rows = rows.max(MIN_ROWS);
    let cols = cols.max(MIN_COLS);
    let mut rng = Mulberry32::new(seed);

    for attempt in 0..MAX_ATTEMPTS {
        match try_generate(rows, cols, min_path_length, &mut rng) {
            Ok(map) => {
                debug!(seed, attempt, rows, cols, "generated map");
                return map;
            }
            Err(reason) => trace!(seed, attempt, %reason, "map attempt rejected"),
        }
    }

    debug!(seed, rows, cols, "falling back to zig-zag layout");
    fallback(rows, cols)
}

/// Deterministic zig-zag layout covering the full map height.
///
/// Starts at row 1 of the first column and alternates two-cell horizontal
/// runs with vertical runs between row 1 and the second to last row.
#[must_use]
pub fn fallback(rows: u32, cols: u32) -> MapConfig {
    let rows = rows.max(MIN_ROWS);
    let cols = cols.max(MIN_COLS);
    let mut map = MapConfig::filled(rows, cols, CellKind::Buildable);

    let last_column = cols - 1;
    let top = EDGE_MARGIN as u32;
    let bottom = rows - 1 - top;
    let mut row = top;
    let mut column = 0;
    map.set(CellCoord::new(column, row), CellKind::Spawn);

    let mut heading_down = true;
    while column < last_column {
        let run = (last_column - column).min(2);
        for _ in 0..run {
            column += 1;
            map.set(CellCoord::new(column, row), CellKind::Path);
        }
        if column >= last_column {
            break;
        }

        let target = if heading_down { bottom } else { top };
        while row != target {
            row = if target > row { row + 1 } else { row - 1 };
            map.set(CellCoord::new(column, row), CellKind::Path);
        }
        heading_down = !heading_down;
    }

    map.set(CellCoord::new(last_column, row), CellKind::Goal);
    map
}

/// Checks the structural rules every playable map satisfies.
///
/// Returns the number of path cells, endpoints included, on success.
pub fn validate(map: &MapConfig) -> Result<usize, MapDefect> {
    let spawns = map.count(CellKind::Spawn);
    if spawns != 1 {
        return Err(MapDefect::SpawnCount(spawns));
    }
    let goals = map.count(CellKind::Goal);
    if goals != 1 {
        return Err(MapDefect::GoalCount(goals));
    }

    for (cell, kind) in map.cells() {
        if !kind.is_path() {
            continue;
        }
        let found = map
            .neighbors(cell)
            .filter(|neighbor| map.cell(*neighbor).is_some_and(CellKind::is_path))
            .count();
        let expected = match kind {
            CellKind::Spawn | CellKind::Goal => 1,
            _ => 2,
        };
        if found != expected {
            return Err(MapDefect::Degree {
                cell,
                found,
                expected,
            });
        }
    }

    let ratio = map.buildable_ratio();
    if ratio < MIN_BUILDABLE_RATIO {
        return Err(MapDefect::Crowded { ratio });
    }

    let total = map.cells().filter(|(_, kind)| kind.is_path()).count();
    let walk = bastion_system_pathing::extract_path(map);
    let ends_at_goal = walk
        .last()
        .is_some_and(|cell| map.cell(*cell) == Some(CellKind::Goal));
    if walk.len() != total || !ends_at_goal {
        return Err(MapDefect::Detached {
            walked: walk.len(),
            total,
        });
    }

    Ok(total)
}

/// Hex encoded SHA-256 digest of the map dimensions and cell kinds.
#[must_use]
pub fn digest(map: &MapConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(map.rows().to_le_bytes());
    hasher.update(map.cols().to_le_bytes());
    let tags: Vec<u8> = map.cells().map(|(_, kind)| kind.tag()).collect();
    hasher.update(&tags);
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("path of {length} cells is shorter than {minimum}")]
    TooShort { length: usize, minimum: usize },
    #[error(transparent)]
    Invalid(#[from] MapDefect),
}

fn try_generate(
    rows: u32,
    cols: u32,
    min_path_length: usize,
    rng: &mut Mulberry32,
) -> Result<MapConfig, AttemptError> {
    let last_column = i64::from(cols) - 1;
    let min_row = EDGE_MARGIN;
    let max_row = i64::from(rows) - 1 - EDGE_MARGIN;

    let spawn_near_top = rng.next_unit() < 0.5;
    let spawn_row = if spawn_near_top {
        rng.range_inclusive(min_row, min_row + 1)
    } else {
        rng.range_inclusive(max_row - 1, max_row)
    };
    let goal_row = if spawn_near_top {
        rng.range_inclusive(max_row - 1, max_row)
    } else {
        rng.range_inclusive(min_row, min_row + 1)
    };

    let mut row = spawn_row;
    let mut column = 0;
    let mut trail = vec![(row, column)];
    let mut heading_down = spawn_near_top;

    while column < last_column {
        let remaining = last_column - column;
        let run = if remaining <= 3 {
            remaining
        } else {
            rng.range_inclusive(2, 3)
        };
        for _ in 0..run {
            column += 1;
            trail.push((row, column));
        }
        if column >= last_column {
            break;
        }

        let target = if heading_down {
            rng.range_inclusive(max_row - 1, max_row)
        } else {
            rng.range_inclusive(min_row, min_row + 1)
        };
        let step = (target - row).signum();
        if step == 0 {
            heading_down = !heading_down;
            continue;
        }
        while row != target {
            row += step;
            trail.push((row, column));
        }
        heading_down = !heading_down;
    }

    if row != goal_row {
        if trail.last().is_some_and(|(_, last)| *last == last_column) {
            let _ = trail.pop();
            column = last_column - 1;
            if trail.last() != Some(&(row, column)) {
                trail.push((row, column));
            }
        }
        let step = (goal_row - row).signum();
        while row != goal_row {
            row += step;
            trail.push((row, column));
        }
        trail.push((row, last_column));
    }

    let mut seen = HashSet::with_capacity(trail.len());
    let path: Vec<CellCoord> = trail
        .into_iter()
        .filter(|cell| seen.insert(*cell))
        .filter_map(|(row, column)| {
            Some(CellCoord::new(
                u32::try_from(column).ok()?,
                u32::try_from(row).ok()?,
            ))
        })
        .collect();

    if path.len() < min_path_length {
        return Err(AttemptError::TooShort {
            length: path.len(),
            minimum: min_path_length,
        });
    }

    let mut map = MapConfig::filled(rows, cols, CellKind::Buildable);
    let last = path.len() - 1;
    for (index, cell) in path.iter().enumerate() {
        let kind = if index == 0 {
            CellKind::Spawn
        } else if index == last {
            CellKind::Goal
        } else {
            CellKind::Path
        };
        map.set(*cell, kind);
    }

    let _ = validate(&map)?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mulberry_matches_reference_stream() {
        let mut rng = Mulberry32::new(42);
        let first = rng.next_unit();
        let second = rng.next_unit();
        assert!((first - 0.601_103_751_920_163_6).abs() < 1e-15, "{first}");
        assert!((second - 0.448_290_558_997_541_67).abs() < 1e-15, "{second}");
    }

    #[test]
    fn range_inclusive_stays_within_bounds() {
        let mut rng = Mulberry32::new(7);
        for _ in 0..1_000 {
            let value = rng.range_inclusive(2, 3);
            assert!((2..=3).contains(&value));
        }
    }

    #[test]
    fn fallback_is_valid_for_small_and_large_maps() {
        for (rows, cols) in [(3, 2), (3, 3), (4, 5), (12, 12), (20, 31)] {
            let map = fallback(rows, cols);
            assert!(validate(&map).is_ok(), "{rows}x{cols}: {:?}", validate(&map));
        }
    }

    #[test]
    fn fallback_layout_matches_expected_zig_zag() {
        let map = fallback(12, 12);
        assert_eq!(map.cell(CellCoord::new(0, 1)), Some(CellKind::Spawn));
        assert_eq!(map.cell(CellCoord::new(11, 10)), Some(CellKind::Goal));
        assert_eq!(validate(&map), Ok(57));
    }

    #[test]
    fn degenerate_dimensions_are_raised() {
        let map = generate(0, 0, 0, 1);
        assert_eq!(map.rows(), MIN_ROWS);
        assert_eq!(map.cols(), MIN_COLS);
        assert!(validate(&map).is_ok());
    }

    #[test]
    fn unreachable_minimum_length_uses_fallback() {
        let map = generate(12, 12, 500, 42);
        assert_eq!(map, fallback(12, 12));
    }

    #[test]
    fn validate_reports_missing_spawn() {
        let map = MapConfig::filled(4, 4, CellKind::Buildable);
        assert_eq!(validate(&map), Err(MapDefect::SpawnCount(0)));
    }

    #[test]
    fn validate_rejects_detached_loops() {
        let rows = [
            "BBBBBB", "SGBPPB", "BBBPPB", "BBBBBB", "BBBBBB", "BBBBBB",
        ];
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
        let map = MapConfig::from_rows(&cells).expect("rectangular");
        assert_eq!(
            validate(&map),
            Err(MapDefect::Detached {
                walked: 2,
                total: 6
            })
        );
    }

    #[test]
    fn digest_distinguishes_layouts() {
        let a = generate(12, 12, 20, 1);
        let b = generate(12, 12, 20, 2024);
        assert_eq!(digest(&a), digest(&a.clone()));
        assert_ne!(digest(&a), digest(&b));
        assert_eq!(digest(&a).len(), 64);
    }
}
