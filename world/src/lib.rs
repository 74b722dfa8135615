#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for the lab layout engine.

pub mod footprints;
mod grid;
mod ingest;
pub mod normalize;
pub mod placement;
pub mod rooms;

use lab_layout_core::{
    CellCoord, CellKind, ChangeCause, Command, Event, GridDimensions, GridSnapshot,
    SnapshotSource,
};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use grid::Grid;
pub use rooms::RoomLayout;

use placement::GroupIdAllocator;

/// Errors raised while constructing a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The grid would be empty or its wall column would lie outside it.
    #[error("invalid grid dimensions {rows}x{columns} with wall column {wall_column}")]
    InvalidDimensions {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
        /// Requested wall column.
        wall_column: u32,
    },
}

/// Represents the authoritative lab layout owned by one editing session.
#[derive(Clone, Debug)]
pub struct Layout {
    grid: Grid,
    ids: GroupIdAllocator,
}

impl Layout {
    /// Creates an empty layout with the default 10 × 24 grid.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid(GridDimensions::DEFAULT)
    }

    /// Creates an empty layout with custom dimensions.
    pub fn with_dimensions(dimensions: GridDimensions) -> Result<Self, LayoutError> {
        if !dimensions.is_valid() {
            return Err(LayoutError::InvalidDimensions {
                rows: dimensions.rows(),
                columns: dimensions.columns(),
                wall_column: dimensions.wall_column(),
            });
        }
        Ok(Self::from_valid(dimensions))
    }

    fn from_valid(dimensions: GridDimensions) -> Self {
        Self {
            grid: Grid::empty(dimensions),
            ids: GroupIdAllocator::new(),
        }
    }

    fn dimensions(&self) -> GridDimensions {
        self.grid.dimensions()
    }

    fn place_fixture(&mut self, kind: CellKind, origin: CellCoord, out_events: &mut Vec<Event>) {
        match placement::place(&self.grid, origin, kind, &mut self.ids) {
            Ok(placed) => {
                self.grid = placed.grid;
                out_events.push(Event::FixturePlaced {
                    group: placed.group,
                    kind,
                    region: placed.region,
                });
                out_events.push(Event::LayoutChanged {
                    cause: ChangeCause::Edit,
                });
            }
            Err(reason) => {
                debug!(?kind, ?origin, ?reason, "placement rejected");
                out_events.push(Event::FixturePlacementRejected {
                    kind,
                    origin,
                    reason,
                });
            }
        }
    }

    fn erase_at(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        match placement::erase(&self.grid, cell) {
            Ok(erased) => {
                self.grid = erased.grid;
                out_events.push(Event::FixtureErased {
                    group: erased.group,
                    kind: erased.kind,
                    region: erased.region,
                });
                out_events.push(Event::LayoutChanged {
                    cause: ChangeCause::Edit,
                });
            }
            Err(reason) => {
                debug!(?cell, ?reason, "erase rejected");
                out_events.push(Event::EraseRejected { cell, reason });
            }
        }
    }

    fn replace_grid(
        &mut self,
        snapshot: Option<GridSnapshot>,
        source: SnapshotSource,
        out_events: &mut Vec<Event>,
    ) {
        let dimensions = self.dimensions();
        self.grid = match snapshot {
            None => {
                info!(?source, "no stored grid, starting from an empty layout");
                Grid::empty(dimensions)
            }
            Some(snapshot) => match ingest::validate(snapshot, dimensions) {
                Ok(raw) => {
                    info!(?source, "ingested grid snapshot");
                    normalize::reconcile(&raw)
                }
                Err(reason) => {
                    warn!(?source, %reason, "discarding malformed grid snapshot");
                    out_events.push(Event::SnapshotDiscarded { source, reason });
                    Grid::empty(dimensions)
                }
            },
        };
        out_events.push(Event::GridReplaced { source });
        out_events.push(Event::LayoutChanged {
            cause: ChangeCause::Ingest,
        });
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the layout, mutating state deterministically.
pub fn apply(layout: &mut Layout, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::PlaceFixture {
            kind: CellKind::Empty,
            origin,
        } => layout.erase_at(origin, out_events),
        Command::PlaceFixture { kind, origin } => layout.place_fixture(kind, origin, out_events),
        Command::EraseAt { cell } => layout.erase_at(cell, out_events),
        Command::ResetGrid => {
            layout.grid = Grid::empty(layout.dimensions());
            out_events.push(Event::GridCleared);
            out_events.push(Event::LayoutChanged {
                cause: ChangeCause::Edit,
            });
        }
        Command::ReplaceGrid { snapshot, source } => {
            layout.replace_grid(snapshot, source, out_events);
        }
    }
}

/// Query functions that provide read-only access to the layout state.
pub mod query {
    use lab_layout_core::{Cell, CellCoord, GridDimensions, GridSnapshot};

    use super::{rooms, Grid, Layout, RoomLayout};

    /// Provides read-only access to the canonical grid.
    #[must_use]
    pub fn grid(layout: &Layout) -> &Grid {
        &layout.grid
    }

    /// Dimensions of the layout's grid.
    #[must_use]
    pub fn dimensions(layout: &Layout) -> GridDimensions {
        layout.grid.dimensions()
    }

    /// Returns the cell at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(layout: &Layout, coord: CellCoord) -> Option<&Cell> {
        layout.grid.cell(coord)
    }

    /// Captures the grid in the shape expected by the persistence collaborator.
    #[must_use]
    pub fn snapshot(layout: &Layout) -> GridSnapshot {
        layout.grid.to_snapshot()
    }

    /// Derives both room layouts from the current grid.
    #[must_use]
    pub fn rooms(layout: &Layout) -> [RoomLayout; 2] {
        rooms::split(&layout.grid)
    }

    /// Counts placed fixtures by their head cells.
    #[must_use]
    pub fn fixture_counts(layout: &Layout) -> FixtureCounts {
        layout
            .grid
            .iter()
            .filter(|(_, cell)| cell.head)
            .fold(FixtureCounts::default(), |mut counts, (_, cell)| {
                if cell.kind.is_seat() {
                    counts.workstations += 1;
                } else if cell.kind.is_desk() {
                    counts.desks += 1;
                }
                counts
            })
    }

    /// Number of fixtures currently placed, grouped the way the editor reports them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FixtureCounts {
        /// Placed workstations.
        pub workstations: u32,
        /// Placed desks, long desks and reception counters.
        pub desks: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_layout_core::{Cell, GroupId, PlacementError, RemovalError, SnapshotDefect};
    use std::time::Duration;

    fn place(layout: &mut Layout, kind: CellKind, column: u32, row: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            layout,
            Command::PlaceFixture {
                kind,
                origin: CellCoord::new(column, row),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn with_dimensions_rejects_wall_outside_grid() {
        assert_eq!(
            Layout::with_dimensions(GridDimensions::new(10, 12, 12)).map(|_| ()),
            Err(LayoutError::InvalidDimensions {
                rows: 10,
                columns: 12,
                wall_column: 12,
            })
        );
        assert!(Layout::with_dimensions(GridDimensions::new(4, 5, 2)).is_ok());
    }

    #[test]
    fn tick_is_echoed_as_time_advanced() {
        let mut layout = Layout::new();
        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }

    #[test]
    fn successful_placement_reports_edit() {
        let mut layout = Layout::new();
        let events = place(&mut layout, CellKind::Workstation, 0, 0);
        assert!(matches!(
            events.as_slice(),
            [
                Event::FixturePlaced {
                    kind: CellKind::Workstation,
                    ..
                },
                Event::LayoutChanged {
                    cause: ChangeCause::Edit
                }
            ]
        ));
    }

    #[test]
    fn rejected_placement_leaves_grid_untouched() {
        let mut layout = Layout::new();
        let before = query::grid(&layout).clone();
        let events = place(&mut layout, CellKind::Desk2x2, 11, 0);
        assert_eq!(
            events,
            vec![Event::FixturePlacementRejected {
                kind: CellKind::Desk2x2,
                origin: CellCoord::new(11, 0),
                reason: PlacementError::CrossesWall,
            }]
        );
        assert_eq!(query::grid(&layout), &before);
    }

    #[test]
    fn placing_empty_erases_the_fixture() {
        let mut layout = Layout::new();
        let _ = place(&mut layout, CellKind::Desk3x5, 13, 0);
        let events = place(&mut layout, CellKind::Empty, 15, 2);
        assert!(matches!(
            events.first(),
            Some(Event::FixtureErased {
                kind: CellKind::Desk3x5,
                ..
            })
        ));
        assert_eq!(query::grid(&layout), &Grid::empty(GridDimensions::DEFAULT));
    }

    #[test]
    fn erasing_wall_is_rejected() {
        let mut layout = Layout::new();
        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::EraseAt {
                cell: CellCoord::new(12, 3),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EraseRejected {
                cell: CellCoord::new(12, 3),
                reason: RemovalError::Wall,
            }]
        );
    }

    #[test]
    fn reset_clears_fixtures_and_reports_edit() {
        let mut layout = Layout::new();
        let _ = place(&mut layout, CellKind::Reception, 0, 0);
        let mut events = Vec::new();
        apply(&mut layout, Command::ResetGrid, &mut events);
        assert_eq!(
            events,
            vec![
                Event::GridCleared,
                Event::LayoutChanged {
                    cause: ChangeCause::Edit
                }
            ]
        );
        assert_eq!(query::fixture_counts(&layout), query::FixtureCounts::default());
    }

    #[test]
    fn replace_grid_normalizes_ingested_snapshot() {
        let mut source = Layout::new();
        let _ = place(&mut source, CellKind::Desk2x2, 0, 0);
        let mut snapshot = query::snapshot(&source);
        if let Some(rows) = snapshot.grid.as_mut() {
            rows[0][0].head = false;
            rows[1][1].head = true;
            rows[1][1].width = Some(4);
        }

        let mut layout = Layout::new();
        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::ReplaceGrid {
                snapshot: Some(snapshot),
                source: SnapshotSource::Store,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::GridReplaced {
                    source: SnapshotSource::Store
                },
                Event::LayoutChanged {
                    cause: ChangeCause::Ingest
                }
            ]
        );
        assert_eq!(query::grid(&layout), query::grid(&source));
    }

    #[test]
    fn malformed_snapshot_falls_back_to_empty_grid() {
        let mut layout = Layout::new();
        let _ = place(&mut layout, CellKind::Workstation, 0, 0);

        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::ReplaceGrid {
                snapshot: Some(GridSnapshot {
                    grid: Some(vec![vec![Cell::empty(); 24]; 10]),
                    rows: 10,
                    cols: 24,
                    wall_col: 8,
                }),
                source: SnapshotSource::Version,
            },
            &mut events,
        );

        assert_eq!(
            events.first(),
            Some(&Event::SnapshotDiscarded {
                source: SnapshotSource::Version,
                reason: SnapshotDefect::WallMismatch,
            })
        );
        assert_eq!(query::grid(&layout), &Grid::empty(GridDimensions::DEFAULT));
    }

    #[test]
    fn absent_snapshot_starts_empty() {
        let mut layout = Layout::new();
        let _ = place(&mut layout, CellKind::Workstation, 0, 0);
        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::ReplaceGrid {
                snapshot: None,
                source: SnapshotSource::Store,
            },
            &mut events,
        );
        assert_eq!(query::grid(&layout), &Grid::empty(GridDimensions::DEFAULT));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn placement_after_ingest_avoids_existing_identifiers() {
        let mut source = Layout::new();
        let _ = place(&mut source, CellKind::Workstation, 0, 0);

        let mut layout = Layout::new();
        let mut events = Vec::new();
        apply(
            &mut layout,
            Command::ReplaceGrid {
                snapshot: Some(query::snapshot(&source)),
                source: SnapshotSource::Store,
            },
            &mut events,
        );
        let events = place(&mut layout, CellKind::Workstation, 1, 0);
        assert!(matches!(
            events.first(),
            Some(Event::FixturePlaced { group, .. }) if group == &GroupId::new("pc-2")
        ));
    }

    #[test]
    fn fixture_counts_tally_heads() {
        let mut layout = Layout::new();
        let _ = place(&mut layout, CellKind::Workstation, 0, 0);
        let _ = place(&mut layout, CellKind::Workstation, 1, 0);
        let _ = place(&mut layout, CellKind::Desk2x2, 3, 3);
        let _ = place(&mut layout, CellKind::Desk3x5, 13, 0);
        let _ = place(&mut layout, CellKind::Reception, 23, 0);
        assert_eq!(
            query::fixture_counts(&layout),
            query::FixtureCounts {
                workstations: 2,
                desks: 3,
            }
        );
    }
}
