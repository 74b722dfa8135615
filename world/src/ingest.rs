//! Structural validation of externally sourced grid snapshots.

use lab_layout_core::{GridDimensions, GridSnapshot, SnapshotDefect};

use crate::grid::Grid;

/// Checks a raw snapshot against the layout's fixed dimensions.
///
/// Only the matrix shape is validated here; fixture metadata is repaired
/// afterwards by [`crate::normalize::reconcile`].
pub(crate) fn validate(
    snapshot: GridSnapshot,
    dimensions: GridDimensions,
) -> Result<Grid, SnapshotDefect> {
    if snapshot.rows != dimensions.rows() || snapshot.cols != dimensions.columns() {
        return Err(SnapshotDefect::DimensionMismatch);
    }
    if snapshot.wall_col != dimensions.wall_column() {
        return Err(SnapshotDefect::WallMismatch);
    }

    let rows = snapshot.grid.ok_or(SnapshotDefect::MissingGrid)?;
    let expected_rows = usize::try_from(dimensions.rows()).unwrap_or(usize::MAX);
    let expected_columns = usize::try_from(dimensions.columns()).unwrap_or(usize::MAX);
    if rows.len() != expected_rows || rows.iter().any(|row| row.len() != expected_columns) {
        return Err(SnapshotDefect::RaggedGrid);
    }

    Ok(Grid::from_rows(dimensions, rows))
}
