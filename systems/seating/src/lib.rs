#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seat selection and occupancy merging for the reservation view.
//!
//! Rooms are described by the room-local coordinates of their seats, which
//! adapters obtain from the world's room query. The system keeps a single
//! selection shared by both rooms. Requests made from that selection are
//! tracked by the [`ReservationLedger`].

mod ledger;

pub use ledger::{LedgerError, ReservationLedger, Ticket};

use lab_layout_core::{
    CellCoord, OccupiedSeat, ReservationRequest, RoomKey, RoomStatuses, SeatId, SeatStatus,
};
use thiserror::Error;

/// Reasons a seat selection or reservation request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The targeted cell does not hold a workstation.
    #[error("{seat} in {} is not a workstation", .seat.room().name())]
    NotASeat {
        /// Seat that was targeted.
        seat: SeatId,
    },
    /// The workstation is already reserved by someone else.
    #[error("{seat} in {} is already occupied", .seat.room().name())]
    Occupied {
        /// Seat that was targeted.
        seat: SeatId,
    },
    /// The whole room is blocked for a group reservation.
    #[error("{} is not available", .room.name())]
    RoomDisabled {
        /// Room that is disabled.
        room: RoomKey,
    },
    /// A reservation was requested without any selected seat.
    #[error("no workstation is selected")]
    NothingSelected,
}

/// Per-seat status for one room.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatMap {
    room: RoomKey,
    seats: Vec<(CellCoord, SeatStatus)>,
}

impl SeatMap {
    /// Room the map describes.
    #[must_use]
    pub const fn room(&self) -> RoomKey {
        self.room
    }

    /// Status of the seat at the room-local cell, `None` for non-seat cells.
    #[must_use]
    pub fn status(&self, cell: CellCoord) -> Option<SeatStatus> {
        self.seats
            .iter()
            .find(|(coord, _)| *coord == cell)
            .map(|(_, status)| *status)
    }

    /// Iterates over every seat and its status in the order supplied to [`merge`].
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, SeatStatus)> + '_ {
        self.seats.iter().copied()
    }
}

/// Seat counts displayed above each room.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoomSummary {
    /// Workstations placed in the room.
    pub total_seats: u32,
    /// Workstations reported as reserved.
    pub occupied: u32,
    /// Workstations that can still be reserved.
    pub available: u32,
    /// Workstations currently selected in this room (zero or one).
    pub selected: u32,
}

/// Merges a room's seats with reported occupancy and the current selection.
///
/// Occupancy wins over selection; every other seat is free.
#[must_use]
pub fn merge(
    room: RoomKey,
    seats: &[CellCoord],
    occupied: &[OccupiedSeat],
    selection: Option<SeatId>,
) -> SeatMap {
    let seats = seats
        .iter()
        .map(|&cell| {
            let seat = SeatId::new(room, cell);
            let status = if is_occupied(occupied, seat) {
                SeatStatus::Occupied
            } else if selection == Some(seat) {
                SeatStatus::Selected
            } else {
                SeatStatus::Free
            };
            (cell, status)
        })
        .collect();
    SeatMap { room, seats }
}

/// Counts seats per status for one room.
#[must_use]
pub fn summarize(
    room: RoomKey,
    seats: &[CellCoord],
    occupied: &[OccupiedSeat],
    selection: Option<SeatId>,
) -> RoomSummary {
    let map = merge(room, seats, occupied, selection);
    let mut summary = RoomSummary::default();
    for (_, status) in map.iter() {
        summary.total_seats += 1;
        match status {
            SeatStatus::Occupied => summary.occupied += 1,
            SeatStatus::Selected => summary.selected += 1,
            SeatStatus::Free => {}
        }
    }
    summary.available = summary.total_seats.saturating_sub(summary.occupied);
    summary
}

fn is_occupied(occupied: &[OccupiedSeat], seat: SeatId) -> bool {
    occupied.iter().any(|entry| entry.seat() == seat)
}

/// Holds the single seat selected across both rooms.
#[derive(Clone, Debug, Default)]
pub struct Seating {
    selection: Option<SeatId>,
}

impl Seating {
    /// Creates a seating system with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selection: None }
    }

    /// Currently selected seat, if any.
    #[must_use]
    pub const fn selection(&self) -> Option<SeatId> {
        self.selection
    }

    /// Toggles the selection of a seat and returns the resulting selection.
    ///
    /// The seat must be a free workstation in an enabled room, even when it is
    /// the current selection; a rejected click changes nothing. Selecting the
    /// seat that is already selected clears it. Any other valid seat replaces
    /// the previous selection, whichever room it was in. `is_seat` should
    /// report whether the room-local cell holds a workstation.
    pub fn select<F>(
        &mut self,
        seat: SeatId,
        is_seat: F,
        occupied: &[OccupiedSeat],
        statuses: &RoomStatuses,
    ) -> Result<Option<SeatId>, SelectionError>
    where
        F: FnOnce(SeatId) -> bool,
    {
        if !is_seat(seat) {
            return Err(SelectionError::NotASeat { seat });
        }
        if is_occupied(occupied, seat) {
            return Err(SelectionError::Occupied { seat });
        }
        if statuses.get(seat.room()).disabled {
            return Err(SelectionError::RoomDisabled { room: seat.room() });
        }
        self.selection = if self.selection == Some(seat) {
            None
        } else {
            Some(seat)
        };
        Ok(self.selection)
    }

    /// Clears the selection in both rooms.
    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// Clears the selection only if it belongs to the given room.
    pub fn clear_room(&mut self, room: RoomKey) {
        if self.selection.is_some_and(|seat| seat.room() == room) {
            self.selection = None;
        }
    }

    /// Drops a selection that no longer refers to a free seat.
    ///
    /// Returns the seat that was dropped, if any.
    pub fn revalidate<F>(&mut self, is_seat: F, occupied: &[OccupiedSeat]) -> Option<SeatId>
    where
        F: FnOnce(SeatId) -> bool,
    {
        let seat = self.selection?;
        if is_seat(seat) && !is_occupied(occupied, seat) {
            return None;
        }
        self.selection = None;
        Some(seat)
    }

    /// Builds the payload for the reservation collaborator.
    pub fn reservation_request(&self) -> Result<ReservationRequest, SelectionError> {
        let seat = self.selection.ok_or(SelectionError::NothingSelected)?;
        Ok(ReservationRequest {
            room_key: seat.room(),
            seat_row: seat.cell().row(),
            seat_col: seat.cell().column(),
        })
    }
}
