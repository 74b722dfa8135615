//! Placement engine that stamps and erases multi-cell fixtures.
//!
//! Both operations are copy-on-write: they borrow the current grid and hand
//! back a new one, so a rejected request leaves the caller's grid untouched.

use lab_layout_core::{
    Cell, CellCoord, CellKind, CellRect, CellRectSize, GroupId, PlacementError, RemovalError,
};

use crate::{footprints::footprint_for, grid::Grid};

/// Hands out fresh group identifiers from a monotonic counter.
///
/// Identifiers already present in the grid (for example from an ingested
/// snapshot) are skipped, so every allocation is unique within that grid.
#[derive(Clone, Debug, Default)]
pub struct GroupIdAllocator {
    next: u64,
}

impl GroupIdAllocator {
    /// Creates an allocator whose first identifier ends in `-1`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    fn allocate(&mut self, kind: CellKind, grid: &Grid) -> GroupId {
        loop {
            self.next = self.next.saturating_add(1);
            let candidate = GroupId::new(format!("{}-{}", kind.wire_name(), self.next));
            if !grid.contains_group(&candidate) {
                return candidate;
            }
        }
    }
}

/// Grid and metadata produced by a successful placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placed {
    /// Grid with the fixture stamped in.
    pub grid: Grid,
    /// Identifier allocated to the fixture.
    pub group: GroupId,
    /// Cells covered by the fixture.
    pub region: CellRect,
}

/// Grid and metadata produced by a successful erase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erased {
    /// Grid with the cells cleared.
    pub grid: Grid,
    /// Identifier of the removed fixture, absent for an ungrouped cell.
    pub group: Option<GroupId>,
    /// Kind of the removed cells.
    pub kind: CellKind,
    /// Bounding box of the cleared cells.
    pub region: CellRect,
}

/// Places a fixture of `kind` with its top-left cell at `origin`.
///
/// Fails closed: the footprint must lie inside the grid, must not contain the
/// wall column, and must cover only empty cells.
pub fn place(
    grid: &Grid,
    origin: CellCoord,
    kind: CellKind,
    ids: &mut GroupIdAllocator,
) -> Result<Placed, PlacementError> {
    let size = footprint_for(kind).ok_or(PlacementError::NoFootprint)?;
    let region = checked_region(grid, origin, size)?;

    if region.spans_column(grid.dimensions().wall_column()) {
        return Err(PlacementError::CrossesWall);
    }

    let blocked = region
        .cells()
        .any(|cell| grid.cell(cell).map_or(true, |existing| !existing.is_empty()));
    if blocked {
        return Err(PlacementError::Occupied);
    }

    let group = ids.allocate(kind, grid);
    let mut next = grid.clone();
    for cell in region.cells() {
        if let Some(slot) = next.cell_mut(cell) {
            *slot = Cell::fixture(kind, group.clone(), size, cell == origin);
        }
    }

    Ok(Placed {
        grid: next,
        group,
        region,
    })
}

/// Clears the fixture covering `target`, or the lone cell when it has no group.
pub fn erase(grid: &Grid, target: CellCoord) -> Result<Erased, RemovalError> {
    let cell = grid.cell(target).ok_or(RemovalError::OutOfBounds)?;
    if target.column() == grid.dimensions().wall_column() || cell.kind == CellKind::Wall {
        return Err(RemovalError::Wall);
    }

    let kind = cell.kind;
    let mut next = grid.clone();

    let Some(group) = cell.group.clone() else {
        if cell.is_empty() {
            return Err(RemovalError::AlreadyEmpty);
        }
        if let Some(slot) = next.cell_mut(target) {
            *slot = Cell::empty();
        }
        return Ok(Erased {
            grid: next,
            group: None,
            kind,
            region: CellRect::from_origin_and_size(target, CellRectSize::new(1, 1)),
        });
    };

    let members: Vec<CellCoord> = grid
        .iter()
        .filter(|(_, candidate)| candidate.group.as_ref() == Some(&group))
        .map(|(coord, _)| coord)
        .collect();
    for &member in &members {
        if let Some(slot) = next.cell_mut(member) {
            *slot = Cell::empty();
        }
    }

    Ok(Erased {
        grid: next,
        group: Some(group),
        kind,
        region: bounding_box(&members).unwrap_or_else(|| {
            CellRect::from_origin_and_size(target, CellRectSize::new(1, 1))
        }),
    })
}

fn checked_region(
    grid: &Grid,
    origin: CellCoord,
    size: CellRectSize,
) -> Result<CellRect, PlacementError> {
    let dimensions = grid.dimensions();
    let column_end = origin.column().checked_add(size.width());
    let row_end = origin.row().checked_add(size.height());
    match (column_end, row_end) {
        (Some(column_end), Some(row_end))
            if column_end <= dimensions.columns() && row_end <= dimensions.rows() =>
        {
            Ok(CellRect::from_origin_and_size(origin, size))
        }
        _ => Err(PlacementError::OutOfBounds),
    }
}

/// Smallest rectangle covering every provided cell.
pub(crate) fn bounding_box(cells: &[CellCoord]) -> Option<CellRect> {
    let first = cells.first()?;
    let (mut min_column, mut max_column) = (first.column(), first.column());
    let (mut min_row, mut max_row) = (first.row(), first.row());
    for cell in &cells[1..] {
        min_column = min_column.min(cell.column());
        max_column = max_column.max(cell.column());
        min_row = min_row.min(cell.row());
        max_row = max_row.max(cell.row());
    }
    Some(CellRect::from_origin_and_size(
        CellCoord::new(min_column, min_row),
        CellRectSize::new(max_column - min_column + 1, max_row - min_row + 1),
    ))
}
