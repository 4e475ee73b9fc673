//! Dense per-cell record of which tower stands where.

use bastion_core::{CellCoord, TowerId};

#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<TowerId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn occupy(&mut self, tower: TowerId, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = Some(tower);
        }
    }

    pub(crate) fn vacate(&mut self, cell: CellCoord) {
        if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = None;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupy_and_vacate_round_trip() {
        let mut grid = OccupancyGrid::new(3, 2);
        let cell = CellCoord::new(2, 1);
        assert_eq!(grid.occupant(cell), None);

        grid.occupy(TowerId::new(5), cell);
        assert_eq!(grid.occupant(cell), Some(TowerId::new(5)));

        grid.vacate(cell);
        assert_eq!(grid.occupant(cell), None);
    }

    #[test]
    fn out_of_bounds_cells_are_never_occupied() {
        let mut grid = OccupancyGrid::new(3, 2);
        let outside = CellCoord::new(3, 0);
        grid.occupy(TowerId::new(1), outside);
        assert_eq!(grid.occupant(outside), None);
    }
}
