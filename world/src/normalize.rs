//! Reconciliation of fixture metadata for grids sourced outside the engine.
//!
//! Group membership is the only per-cell field trusted from a snapshot. Width,
//! height, head flags and the kind of non-head cells are re-derived from the
//! actual member coordinates of each group.

use std::collections::BTreeMap;

use lab_layout_core::{Cell, CellCoord, CellKind, CellRectSize, GroupId};
use tracing::debug;

use crate::{footprints::footprint_for, grid::Grid, placement::bounding_box};

/// Rebuilds canonical fixture metadata from group membership.
///
/// Every group whose members exactly fill a footprint-sized rectangle clear of
/// the wall column is rewritten with fresh `width`/`height`, a single kind and
/// a single head at the top-left cell. The kind is the first member kind, in
/// row-major order, whose footprint matches the rectangle, so a stale `type`
/// on any one member does not lose the fixture. Groups that cannot satisfy
/// those rules are dropped, ungrouped cells become empty floor and the wall
/// column is restored. The result is a fixed point: reconciling it again
/// yields an equal grid.
#[must_use]
pub fn reconcile(grid: &Grid) -> Grid {
    let dimensions = grid.dimensions();
    let wall_column = dimensions.wall_column();

    let mut members: BTreeMap<&GroupId, Vec<CellCoord>> = BTreeMap::new();
    for (coord, cell) in grid.iter() {
        if coord.column() == wall_column {
            continue;
        }
        if let Some(group) = cell.group.as_ref() {
            members.entry(group).or_default().push(coord);
        }
    }

    let mut next = Grid::empty(dimensions);
    for (group, cells) in members {
        let Some(region) = bounding_box(&cells) else {
            continue;
        };
        let filled =
            usize::try_from(region.size().area()).map_or(false, |area| area == cells.len());
        let kind = member_kind(grid, &cells, region.size());
        let Some(kind) = kind.filter(|_| filled && !region.spans_column(wall_column)) else {
            debug!(
                group = %group,
                members = cells.len(),
                "dropping fixture group that does not form a valid footprint"
            );
            continue;
        };

        for coord in region.cells() {
            if let Some(slot) = next.cell_mut(coord) {
                let head = coord == region.origin();
                *slot = Cell::fixture(kind, group.clone(), region.size(), head);
            }
        }
    }

    next
}

fn member_kind(grid: &Grid, cells: &[CellCoord], size: CellRectSize) -> Option<CellKind> {
    cells
        .iter()
        .filter_map(|&coord| grid.cell(coord))
        .map(|cell| cell.kind)
        .find(|&kind| footprint_for(kind) == Some(size))
}
