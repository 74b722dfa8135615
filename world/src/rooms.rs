//! Derives the two room layouts on either side of the wall column.

use lab_layout_core::{Cell, CellCoord, RoomKey};

use crate::grid::Grid;

/// Column slice of the grid belonging to one room, re-indexed from zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    key: RoomKey,
    rows: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl RoomLayout {
    /// Room this layout belongs to.
    #[must_use]
    pub const fn key(&self) -> RoomKey {
        self.key
    }

    /// Display name of the room.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.key.name()
    }

    /// Number of rows in the room.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the room.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Returns the cell at the room-local coordinate.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if coord.column() >= self.columns || coord.row() >= self.rows {
            return None;
        }
        let index = coord.row() as usize * self.columns as usize + coord.column() as usize;
        self.cells.get(index)
    }

    /// Iterates over every cell with its room-local coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Cell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), cell)
        })
    }

    /// Room-local coordinates of every seat in row-major order.
    pub fn seats(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.kind.is_seat())
            .map(|(coord, _)| coord)
    }
}

/// Splits the grid around its wall column.
///
/// `Sala 1` covers columns `[0, wall)`; `Sala 2` covers `(wall, columns)`
/// re-indexed to start at zero. Cell metadata is copied verbatim.
#[must_use]
pub fn split(grid: &Grid) -> [RoomLayout; 2] {
    let dimensions = grid.dimensions();
    let wall = dimensions.wall_column().min(dimensions.columns());
    let right_start = wall.saturating_add(1).min(dimensions.columns());
    [
        slice(grid, RoomKey::Sala1, 0, wall),
        slice(grid, RoomKey::Sala2, right_start, dimensions.columns()),
    ]
}

fn slice(grid: &Grid, key: RoomKey, start: u32, end: u32) -> RoomLayout {
    let rows = grid.dimensions().rows();
    let cells = grid
        .iter()
        .filter(|(coord, _)| (start..end).contains(&coord.column()))
        .map(|(_, cell)| cell.clone())
        .collect();
    RoomLayout {
        key,
        rows,
        columns: end - start,
        cells,
    }
}
