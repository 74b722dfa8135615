//! Dense storage for the shared lab grid.

use lab_layout_core::{Cell, CellCoord, GridDimensions, GridSnapshot, GroupId};

/// Row-major matrix of cells with one column reserved for the dividing wall.
///
/// Grids are values: placement, erase and reconciliation produce new grids
/// instead of mutating the caller's copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid where every cell is empty except the wall column.
    #[must_use]
    pub fn empty(dimensions: GridDimensions) -> Self {
        let columns = dimensions.columns();
        let capacity_u64 = u64::from(dimensions.rows()) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for _ in 0..dimensions.rows() {
            for column in 0..columns {
                if column == dimensions.wall_column() {
                    cells.push(Cell::wall());
                } else {
                    cells.push(Cell::empty());
                }
            }
        }
        Self { dimensions, cells }
    }

    /// Builds a grid from rows already checked against `dimensions`.
    pub(crate) fn from_rows(dimensions: GridDimensions, rows: Vec<Vec<Cell>>) -> Self {
        let cells = rows.into_iter().flatten().collect();
        Self { dimensions, cells }
    }

    /// Dimensions the grid was created with.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Returns the cell at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        self.index(coord).and_then(|index| self.cells.get_mut(index))
    }

    /// Iterates over every cell together with its coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Cell)> + '_ {
        let columns = self.dimensions.columns().max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), cell)
        })
    }

    /// Iterates over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        let width = usize::try_from(self.dimensions.columns())
            .unwrap_or(0)
            .max(1);
        self.cells.chunks(width)
    }

    /// Reports whether any cell carries the provided group identifier.
    #[must_use]
    pub fn contains_group(&self, group: &GroupId) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.group.as_ref() == Some(group))
    }

    /// Captures the grid in the shape expected by the persistence collaborator.
    #[must_use]
    pub fn to_snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            grid: Some(self.rows().map(<[Cell]>::to_vec).collect()),
            rows: self.dimensions.rows(),
            cols: self.dimensions.columns(),
            wall_col: self.dimensions.wall_column(),
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.dimensions.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.dimensions.columns()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_layout_core::CellKind;

    #[test]
    fn empty_grid_has_only_the_wall_column_filled() {
        let grid = Grid::empty(GridDimensions::DEFAULT);
        for (coord, cell) in grid.iter() {
            if coord.column() == 12 {
                assert_eq!(cell, &Cell::wall(), "wall missing at {coord:?}");
            } else {
                assert_eq!(cell, &Cell::empty(), "unexpected content at {coord:?}");
            }
        }
        assert_eq!(grid.iter().count(), 240);
    }

    #[test]
    fn out_of_bounds_cells_are_absent() {
        let grid = Grid::empty(GridDimensions::new(2, 3, 1));
        assert!(grid.cell(CellCoord::new(2, 1)).is_some());
        assert!(grid.cell(CellCoord::new(3, 0)).is_none());
        assert!(grid.cell(CellCoord::new(0, 2)).is_none());
    }

    #[test]
    fn snapshot_mirrors_rows_and_dimensions() {
        let grid = Grid::empty(GridDimensions::new(2, 3, 1));
        let snapshot = grid.to_snapshot();
        assert_eq!(snapshot.rows, 2);
        assert_eq!(snapshot.cols, 3);
        assert_eq!(snapshot.wall_col, 1);
        let rows = snapshot.grid.expect("grid present");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 3));
        assert_eq!(rows[1][1].kind, CellKind::Wall);
    }
}
