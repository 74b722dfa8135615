//! Property-based invariant tests for placement, reconciliation and rooms.
//!
//! 1. A successful placement stamps exactly `w * h` cells with one head.
//! 2. A rejected placement leaves the grid unchanged.
//! 3. Reconciling an ingested grid again yields the same grid.
//! 4. Head flags, sizes and member kinds are recovered from group membership.
//! 5. Splitting into rooms and rejoining around the wall reproduces the grid.

use lab_layout_core::{
    Cell, CellCoord, CellKind, Command, Event, GridDimensions, GridSnapshot, GroupId,
    SnapshotSource,
};
use lab_layout_world::{
    apply, footprints::footprint_for, normalize::reconcile, query, rooms::split, Grid, Layout,
};
use proptest::prelude::*;

const ROWS: u32 = GridDimensions::DEFAULT.rows();
const COLUMNS: u32 = GridDimensions::DEFAULT.columns();
const CELLS: usize = (ROWS * COLUMNS) as usize;

// ── Helpers ──────────────────────────────────────────────────────────

fn arb_kind() -> impl Strategy<Value = CellKind> {
    prop_oneof![
        Just(CellKind::Empty),
        Just(CellKind::Workstation),
        Just(CellKind::Desk2x2),
        Just(CellKind::Desk3x5),
        Just(CellKind::Reception),
        Just(CellKind::Wall),
    ]
}

fn arb_fixture() -> impl Strategy<Value = CellKind> {
    prop_oneof![
        Just(CellKind::Workstation),
        Just(CellKind::Desk2x2),
        Just(CellKind::Desk3x5),
        Just(CellKind::Reception),
    ]
}

fn arb_placements() -> impl Strategy<Value = Vec<(CellKind, u32, u32)>> {
    prop::collection::vec((arb_fixture(), 0..COLUMNS + 2, 0..ROWS + 2), 0..32)
}

fn arb_cell() -> impl Strategy<Value = Cell> {
    (
        arb_kind(),
        prop::option::of(0u8..4),
        prop::option::of(0u32..8),
        prop::option::of(0u32..8),
        any::<bool>(),
    )
        .prop_map(|(kind, group, width, height, head)| Cell {
            kind,
            group: group.map(|group| GroupId::new(format!("g{group}"))),
            width,
            height,
            head,
        })
}

/// Per-cell metadata noise that never changes group membership.
#[derive(Clone, Debug)]
struct Noise {
    head: bool,
    width: Option<u32>,
    height: Option<u32>,
    stale_kind: Option<CellKind>,
}

fn arb_noise() -> impl Strategy<Value = Vec<Noise>> {
    prop::collection::vec(
        (
            any::<bool>(),
            prop::option::of(0u32..8),
            prop::option::of(0u32..8),
            prop::option::of(arb_kind()),
        )
            .prop_map(|(head, width, height, stale_kind)| Noise {
                head,
                width,
                height,
                stale_kind,
            }),
        CELLS,
    )
}

fn furnish(placements: &[(CellKind, u32, u32)]) -> Layout {
    let mut layout = Layout::new();
    let mut events = Vec::new();
    for &(kind, column, row) in placements {
        apply(
            &mut layout,
            Command::PlaceFixture {
                kind,
                origin: CellCoord::new(column, row),
            },
            &mut events,
        );
    }
    layout
}

fn ingest(rows: Vec<Vec<Cell>>) -> Layout {
    let dimensions = GridDimensions::DEFAULT;
    let mut layout = Layout::new();
    let mut events = Vec::new();
    apply(
        &mut layout,
        Command::ReplaceGrid {
            snapshot: Some(GridSnapshot {
                grid: Some(rows),
                rows: dimensions.rows(),
                cols: dimensions.columns(),
                wall_col: dimensions.wall_column(),
            }),
            source: SnapshotSource::Store,
        },
        &mut events,
    );
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::SnapshotDiscarded { .. })),
        "well-shaped snapshot must not be discarded"
    );
    layout
}

fn rows_of(grid: &Grid) -> Vec<Vec<Cell>> {
    grid.rows().map(<[Cell]>::to_vec).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Placement stamps whole footprints or changes nothing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn placement_is_all_or_nothing(
        placements in arb_placements(),
        kind in arb_fixture(),
        column in 0..COLUMNS + 2,
        row in 0..ROWS + 2,
    ) {
        let mut layout = furnish(&placements);
        let before = query::grid(&layout).clone();
        let mut events = Vec::new();
        let origin = CellCoord::new(column, row);
        apply(&mut layout, Command::PlaceFixture { kind, origin }, &mut events);
        let after = query::grid(&layout);

        match events.first() {
            Some(Event::FixturePlaced { group, region, .. }) => {
                let size = footprint_for(kind).expect("fixtures have footprints");
                let members: Vec<(CellCoord, &Cell)> = after
                    .iter()
                    .filter(|(_, cell)| cell.group.as_ref() == Some(group))
                    .collect();
                prop_assert_eq!(members.len() as u32, size.area());
                prop_assert_eq!(region.origin(), origin);
                let heads: Vec<CellCoord> = members
                    .iter()
                    .filter(|(_, cell)| cell.head)
                    .map(|(coord, _)| *coord)
                    .collect();
                prop_assert_eq!(heads, vec![origin]);
                for (coord, cell) in &members {
                    prop_assert!(region.contains(*coord));
                    prop_assert_eq!(cell.kind, kind);
                    prop_assert_eq!(cell.width, Some(size.width()));
                    prop_assert_eq!(cell.height, Some(size.height()));
                }
            }
            Some(Event::FixturePlacementRejected { .. }) => {
                prop_assert_eq!(after, &before);
            }
            other => prop_assert!(false, "unexpected event {:?}", other),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Reconciliation is a fixed point
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reconcile_is_idempotent(cells in prop::collection::vec(arb_cell(), CELLS)) {
        let rows: Vec<Vec<Cell>> = cells
            .chunks(COLUMNS as usize)
            .map(<[Cell]>::to_vec)
            .collect();
        let layout = ingest(rows);
        let once = query::grid(&layout);
        prop_assert_eq!(&reconcile(once), once);

        let wall = GridDimensions::DEFAULT.wall_column();
        for (coord, cell) in once.iter() {
            if coord.column() == wall {
                prop_assert_eq!(cell, &Cell::wall());
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Metadata is recovered while group membership is intact
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn corrupted_metadata_is_recovered(placements in arb_placements(), noise in arb_noise()) {
        let layout = furnish(&placements);
        let canonical = query::grid(&layout);

        // Head cells keep their kind so every group stays recognisable.
        let mut corrupted = rows_of(canonical);
        for (index, (coord, original)) in canonical.iter().enumerate() {
            if original.group.is_none() {
                continue;
            }
            let jitter = &noise[index];
            let cell = &mut corrupted[coord.row() as usize][coord.column() as usize];
            cell.head = jitter.head;
            cell.width = jitter.width;
            cell.height = jitter.height;
            if let (Some(kind), false) = (jitter.stale_kind, original.head) {
                cell.kind = kind;
            }
        }

        let recovered = ingest(corrupted);
        prop_assert_eq!(query::grid(&recovered), canonical);
    }

    #[test]
    fn stale_kind_on_any_single_member_is_recovered(
        placements in arb_placements(),
        pick in any::<prop::sample::Index>(),
        stale in arb_kind(),
    ) {
        let layout = furnish(&placements);
        let canonical = query::grid(&layout);
        let grouped: Vec<(CellCoord, &Cell)> = canonical
            .iter()
            .filter(|(_, cell)| {
                cell.group.is_some()
                    && cell.width.zip(cell.height).is_some_and(|(w, h)| w * h > 1)
            })
            .collect();
        prop_assume!(!grouped.is_empty());

        let (coord, _) = grouped[pick.index(grouped.len())];
        let mut corrupted = rows_of(canonical);
        let cell = &mut corrupted[coord.row() as usize][coord.column() as usize];
        cell.kind = stale;
        cell.head = !cell.head;

        let recovered = ingest(corrupted);
        prop_assert_eq!(query::grid(&recovered), canonical);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Rooms rejoin around the wall
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rooms_rejoin_into_the_grid(placements in arb_placements()) {
        let layout = furnish(&placements);
        let grid = query::grid(&layout);
        let [left, right] = split(grid);

        for (row, original) in grid.rows().enumerate() {
            let row = row as u32;
            let mut rejoined: Vec<Cell> = (0..left.columns())
                .filter_map(|column| left.cell(CellCoord::new(column, row)).cloned())
                .collect();
            rejoined.push(Cell::wall());
            rejoined.extend(
                (0..right.columns())
                    .filter_map(|column| right.cell(CellCoord::new(column, row)).cloned()),
            );
            prop_assert_eq!(rejoined.as_slice(), original);
        }
    }
}
