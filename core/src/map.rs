//! Grid vocabulary shared by map generation, path reduction and the world.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Neighbour offsets expressed as `(row delta, column delta)`.
///
/// The order (up, down, left, right) is load-bearing: path walks and degree
/// checks visit neighbours in exactly this sequence.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Location of a single cell within the map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the cell displaced by the provided row and column deltas.
    ///
    /// Yields `None` when the result would leave the non-negative quadrant.
    #[must_use]
    pub fn offset(&self, row_delta: i64, column_delta: i64) -> Option<Self> {
        let row = u32::try_from(i64::from(self.row) + row_delta).ok()?;
        let column = u32::try_from(i64::from(self.column) + column_delta).ok()?;
        Some(Self::new(column, row))
    }
}

/// Classification of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open ground that accepts tower construction.
    Buildable,
    /// Interior cell of the enemy path.
    Path,
    /// Cell where enemies enter the map.
    Spawn,
    /// Cell enemies attempt to reach.
    Goal,
}

impl CellKind {
    /// Reports whether the cell belongs to the enemy path, endpoints included.
    #[must_use]
    pub const fn is_path(self) -> bool {
        !matches!(self, Self::Buildable)
    }

    /// Stable byte tag used when hashing maps.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Buildable => 0,
            Self::Path => 1,
            Self::Spawn => 2,
            Self::Goal => 3,
        }
    }
}

/// Errors reported when assembling a map from explicit rows.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MapShapeError {
    /// No rows, or rows without any cells, were supplied.
    #[error("map must contain at least one cell")]
    Empty,
    /// A row's length differs from the first row's length.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Number of cells found in the first row.
        expected: usize,
        /// Number of cells found in the offending row.
        found: usize,
    },
}

/// Rectangular map consumed by the simulation.
///
/// Cells are stored row-major. World-space projection uses `cell_size` for the
/// horizontal pitch; `cell_height` is carried for presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    rows: u32,
    cols: u32,
    cell_size: f32,
    cell_height: f32,
    cells: Vec<CellKind>,
}

impl MapConfig {
    /// Horizontal pitch applied by generated maps.
    pub const DEFAULT_CELL_SIZE: f32 = 1.0;
    /// Vertical extent applied by generated maps.
    pub const DEFAULT_CELL_HEIGHT: f32 = 0.2;

    /// Creates a map of the provided dimensions where every cell has `kind`.
    #[must_use]
    pub fn filled(rows: u32, cols: u32, kind: CellKind) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            cell_size: Self::DEFAULT_CELL_SIZE,
            cell_height: Self::DEFAULT_CELL_HEIGHT,
            cells: vec![kind; len],
        }
    }

    /// Assembles a map from explicit rows of cells.
    pub fn from_rows(rows: &[Vec<CellKind>]) -> Result<Self, MapShapeError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(MapShapeError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(MapShapeError::Ragged {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            rows: u32::try_from(rows.len()).map_err(|_| MapShapeError::Empty)?,
            cols: u32::try_from(expected).map_err(|_| MapShapeError::Empty)?,
            cell_size: Self::DEFAULT_CELL_SIZE,
            cell_height: Self::DEFAULT_CELL_HEIGHT,
            cells,
        })
    }

    /// Overrides the world-space cell dimensions.
    #[must_use]
    pub fn with_cell_dimensions(mut self, cell_size: f32, cell_height: f32) -> Self {
        self.cell_size = cell_size;
        self.cell_height = cell_height;
        self
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Horizontal world-space size of a single cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Vertical world-space size of a single cell.
    #[must_use]
    pub const fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.cols && cell.row() < self.rows
    }

    /// Kind of the cell at `cell`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellKind> {
        self.index(cell).map(|index| self.cells[index])
    }

    /// Overwrites the kind of an in-bounds cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            self.cells[index] = kind;
        }
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let cols = self.cols.max(1);
        self.cells.iter().enumerate().map(move |(index, kind)| {
            let index = index as u32;
            (CellCoord::new(index % cols, index / cols), *kind)
        })
    }

    /// First cell of the provided kind in row-major order.
    #[must_use]
    pub fn first(&self, kind: CellKind) -> Option<CellCoord> {
        self.cells()
            .find(|(_, candidate)| *candidate == kind)
            .map(|(cell, _)| cell)
    }

    /// Number of cells with the provided kind.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|candidate| **candidate == kind).count()
    }

    /// Share of cells that remain buildable.
    #[must_use]
    pub fn buildable_ratio(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.count(CellKind::Buildable) as f64 / self.cells.len() as f64
    }

    /// In-grid neighbours of `cell`, visited in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |(row_delta, column_delta)| cell.offset(*row_delta, *column_delta))
            .filter(move |neighbor| self.contains(*neighbor))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.row() as usize * self.cols as usize + cell.column() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(0, -1), None);
        assert_eq!(origin.offset(1, 2), Some(CellCoord::new(2, 1)));
    }

    #[test]
    fn neighbors_follow_up_down_left_right() {
        let map = MapConfig::filled(3, 3, CellKind::Buildable);
        let neighbors: Vec<_> = map.neighbors(CellCoord::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(1, 2),
                CellCoord::new(0, 1),
                CellCoord::new(2, 1),
            ]
        );
    }

    #[test]
    fn neighbors_are_clipped_at_the_border() {
        let map = MapConfig::filled(2, 2, CellKind::Buildable);
        assert_eq!(map.neighbors(CellCoord::new(0, 0)).count(), 2);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![
            vec![CellKind::Buildable, CellKind::Buildable],
            vec![CellKind::Buildable],
        ];
        assert_eq!(
            MapConfig::from_rows(&rows),
            Err(MapShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(MapConfig::from_rows(&[]), Err(MapShapeError::Empty));
    }

    #[test]
    fn cells_are_reported_row_major() {
        let rows = vec![
            vec![CellKind::Spawn, CellKind::Path],
            vec![CellKind::Buildable, CellKind::Goal],
        ];
        let map = MapConfig::from_rows(&rows).expect("rectangular rows");
        assert_eq!(map.first(CellKind::Goal), Some(CellCoord::new(1, 1)));
        assert_eq!(map.cell(CellCoord::new(1, 0)), Some(CellKind::Path));
        assert_eq!(map.cell(CellCoord::new(2, 0)), None);
        assert!((map.buildable_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut map = MapConfig::filled(2, 2, CellKind::Buildable);
        map.set(CellCoord::new(5, 5), CellKind::Path);
        assert_eq!(map.count(CellKind::Path), 0);
    }
}
