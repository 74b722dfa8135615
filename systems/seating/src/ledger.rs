//! Reservation ledger driving the front-desk workflow.
//!
//! A request enters as `Pending`, becomes `Active` once the front desk checks
//! the access code printed on the voucher, and leaves the ledger on release.

use lab_layout_core::{OccupiedSeat, Reservation, ReservationRequest, ReservationStatus, SeatId};
use thiserror::Error;

/// Reasons the ledger refused a request, validation or release.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The reservation needs a holder name.
    #[error("a reservation needs a holder")]
    MissingHolder,
    /// The seat is already held by another reservation.
    #[error("{seat} in {} is already reserved", .seat.room().name())]
    SeatTaken {
        /// Seat that was requested.
        seat: SeatId,
    },
    /// Each holder may keep only one reservation at a time.
    #[error("{holder} already holds reservation {id}")]
    HolderHasReservation {
        /// Holder named in the request.
        holder: String,
        /// Reservation the holder already has.
        id: String,
    },
    /// The identifier is already used in the ledger.
    #[error("reservation {0} already exists")]
    DuplicateId(String),
    /// No reservation with that identifier exists.
    #[error("reservation {0} does not exist")]
    UnknownReservation(String),
    /// Validation was attempted without a code.
    #[error("enter the access code from the voucher")]
    MissingCode,
    /// The code does not match the voucher.
    #[error("access code does not match reservation {0}")]
    CodeMismatch(String),
    /// Only pending reservations can be validated.
    #[error("reservation {0} is not pending")]
    NotPending(String),
    /// Only active reservations can be released.
    #[error("reservation {0} is not active")]
    NotActive(String),
}

/// Identifier, code and timestamp issued for a new reservation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    /// Ledger identifier.
    pub id: String,
    /// Access code for the voucher; stored uppercase.
    pub code: String,
    /// RFC 3339 timestamp of the request.
    pub requested_at: String,
}

/// In-memory reservation ledger loaded from and written back to the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationLedger {
    entries: Vec<Reservation>,
}

impl ReservationLedger {
    /// Wraps the entries loaded from the store.
    #[must_use]
    pub fn new(entries: Vec<Reservation>) -> Self {
        Self { entries }
    }

    /// Every reservation in request order.
    #[must_use]
    pub fn entries(&self) -> &[Reservation] {
        &self.entries
    }

    /// Reservations still waiting for validation.
    pub fn pending(&self) -> impl Iterator<Item = &Reservation> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.status == ReservationStatus::Pending)
    }

    /// Reports whether an identifier is already in use.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Seats held by the ledger, for the occupancy merger.
    #[must_use]
    pub fn occupied(&self) -> Vec<OccupiedSeat> {
        self.entries.iter().map(Reservation::occupied).collect()
    }

    /// Records a pending reservation for the requested seat.
    ///
    /// The holder name is trimmed. A seat can carry one reservation and a
    /// holder can keep one reservation, whichever room it is in.
    pub fn submit(
        &mut self,
        request: ReservationRequest,
        holder: &str,
        ticket: Ticket,
    ) -> Result<&Reservation, LedgerError> {
        let holder = holder.trim();
        if holder.is_empty() {
            return Err(LedgerError::MissingHolder);
        }
        let reservation = Reservation {
            id: ticket.id,
            status: ReservationStatus::Pending,
            code: normalize_code(&ticket.code),
            room_key: request.room_key,
            seat_row: request.seat_row,
            seat_col: request.seat_col,
            requested_at: ticket.requested_at,
            holder: holder.to_owned(),
        };

        if self.contains(&reservation.id) {
            return Err(LedgerError::DuplicateId(reservation.id));
        }
        let seat = reservation.seat();
        if self.entries.iter().any(|entry| entry.seat() == seat) {
            return Err(LedgerError::SeatTaken { seat });
        }
        if let Some(existing) = self.entries.iter().find(|entry| entry.holder == holder) {
            return Err(LedgerError::HolderHasReservation {
                holder: reservation.holder,
                id: existing.id.clone(),
            });
        }

        self.entries.push(reservation);
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Activates a pending reservation once its access code checks out.
    ///
    /// The entered code is trimmed and uppercased before comparison.
    pub fn validate(&mut self, id: &str, code: &str) -> Result<&Reservation, LedgerError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(LedgerError::MissingCode);
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| LedgerError::UnknownReservation(id.to_owned()))?;
        if entry.status != ReservationStatus::Pending {
            return Err(LedgerError::NotPending(id.to_owned()));
        }
        if entry.code != code {
            return Err(LedgerError::CodeMismatch(id.to_owned()));
        }
        entry.status = ReservationStatus::Active;
        Ok(&*entry)
    }

    /// Frees the seat of an active reservation and hands back the entry.
    pub fn release(&mut self, id: &str) -> Result<Reservation, LedgerError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| LedgerError::UnknownReservation(id.to_owned()))?;
        if self.entries[index].status != ReservationStatus::Active {
            return Err(LedgerError::NotActive(id.to_owned()));
        }
        Ok(self.entries.remove(index))
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
