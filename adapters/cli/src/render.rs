use std::fmt::Write as _;

use lab_layout_core::{
    Cell, CellKind, Event, LayoutVersion, Reservation, ReservationStatus, RoomStatus, SeatStatus,
};
use lab_layout_system_seating::{RoomSummary, SeatMap};
use lab_layout_world::{query::FixtureCounts, Grid, RoomLayout};

fn glyph(cell: &Cell) -> char {
    let glyph = match cell.kind {
        CellKind::Empty => return '.',
        CellKind::Wall => return '|',
        CellKind::Workstation => 'P',
        CellKind::Desk2x2 => 'D',
        CellKind::Desk3x5 => 'L',
        CellKind::Reception => 'R',
    };
    if cell.head {
        glyph
    } else {
        glyph.to_ascii_lowercase()
    }
}

fn seat_glyph(status: SeatStatus) -> char {
    match status {
        SeatStatus::Free => 'o',
        SeatStatus::Selected => '*',
        SeatStatus::Occupied => 'x',
    }
}

/// Renders the editor grid, one text line per row. Head cells are uppercase.
pub(crate) fn grid(grid: &Grid) -> String {
    let mut out = String::new();
    for row in grid.rows() {
        out.extend(row.iter().map(glyph));
        out.push('\n');
    }
    out
}

pub(crate) fn fixture_counts(counts: FixtureCounts) -> String {
    format!("PCs: {}  Escritorios: {}", counts.workstations, counts.desks)
}

/// Renders one room of the reservation view with seat statuses overlaid.
pub(crate) fn room(
    room: &RoomLayout,
    seats: &SeatMap,
    status: &RoomStatus,
    summary: RoomSummary,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}): {} PCs, {} ocupados, {} disponibles, {} seleccionados",
        room.name(),
        room.key(),
        summary.total_seats,
        summary.occupied,
        summary.available,
        summary.selected
    );
    if status.disabled {
        let holder = status.reserved_by.as_deref().unwrap_or("sin nombre");
        let _ = writeln!(out, "  sala reservada por: {holder}");
    }
    for row in 0..room.rows() {
        out.push_str("  ");
        for column in 0..room.columns() {
            let coord = lab_layout_core::CellCoord::new(column, row);
            let symbol = match seats.status(coord) {
                Some(status) => seat_glyph(status),
                None => room.cell(coord).map_or(' ', glyph),
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

pub(crate) fn versions(versions: &[LayoutVersion]) -> String {
    if versions.is_empty() {
        return "no saved versions\n".to_owned();
    }
    versions
        .iter()
        .map(|version| format!("{}  {}\n", version.id, version.saved_at))
        .collect()
}

fn reservation_status(status: ReservationStatus) -> &'static str {
    match status {
        ReservationStatus::Pending => "pendiente",
        ReservationStatus::Active => "activa",
    }
}

/// Lists ledger entries the way the front desk reviews them.
pub(crate) fn reservations<'a>(entries: impl IntoIterator<Item = &'a Reservation>) -> String {
    let lines: String = entries
        .into_iter()
        .map(|entry| {
            format!(
                "{}  {}  {} PC {}  {}  código {}  {}\n",
                entry.id,
                reservation_status(entry.status),
                entry.room_key.name(),
                entry.seat(),
                entry.holder,
                entry.code,
                entry.requested_at
            )
        })
        .collect();
    if lines.is_empty() {
        return "no reservation requests\n".to_owned();
    }
    lines
}

/// Voucher shown to the holder after a request.
pub(crate) fn voucher(reservation: &Reservation) -> String {
    format!(
        "reserva {}\n  {}: {} PC {}\n  código de acceso: {}\n",
        reservation.id,
        reservation.holder,
        reservation.room_key.name(),
        reservation.seat(),
        reservation.code
    )
}

/// Human readable outcome of a world event, `None` for bookkeeping events.
pub(crate) fn event(event: &Event) -> Option<String> {
    match event {
        Event::FixturePlaced {
            group,
            kind,
            region,
        } => Some(format!(
            "placed {kind} {group} at ({}, {})",
            region.origin().column(),
            region.origin().row()
        )),
        Event::FixturePlacementRejected {
            kind,
            origin,
            reason,
        } => Some(format!(
            "rejected {kind} at ({}, {}): {reason:?}",
            origin.column(),
            origin.row()
        )),
        Event::FixtureErased { kind, region, .. } => Some(format!(
            "erased {kind} at ({}, {})",
            region.origin().column(),
            region.origin().row()
        )),
        Event::EraseRejected { cell, reason } => Some(format!(
            "nothing erased at ({}, {}): {reason:?}",
            cell.column(),
            cell.row()
        )),
        Event::GridCleared => Some("grid cleared".to_owned()),
        Event::SnapshotDiscarded { source, reason } => {
            Some(format!("discarded {source:?} snapshot: {reason}"))
        }
        Event::TimeAdvanced { .. } | Event::GridReplaced { .. } | Event::LayoutChanged { .. } => {
            None
        }
    }
}
