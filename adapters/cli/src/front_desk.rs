use chrono::{DateTime, SecondsFormat, Utc};
use lab_layout_system_seating::{ReservationLedger, Ticket};
use rand::{distributions::Alphanumeric, Rng};

/// Length of the access code printed on a voucher.
const ACCESS_CODE_LENGTH: usize = 6;

/// Issues the identifier, access code and timestamp for a new request.
///
/// Identifiers are UTC timestamps, suffixed `-2`, `-3` when the ledger
/// already holds one from the same millisecond.
pub(crate) fn issue_ticket<R: Rng>(
    ledger: &ReservationLedger,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Ticket {
    let stem = format!("r{}", now.format("%Y%m%dT%H%M%S%3fZ"));
    let mut id = stem.clone();
    let mut suffix = 1;
    while ledger.contains(&id) {
        suffix += 1;
        id = format!("{stem}-{suffix}");
    }

    let code: String = rng
        .sample_iter(&Alphanumeric)
        .take(ACCESS_CODE_LENGTH)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();

    Ticket {
        id,
        code,
        requested_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lab_layout_core::{ReservationRequest, RoomKey};
    use rand::{rngs::StdRng, SeedableRng};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn ticket_carries_uppercase_code_and_timestamp() {
        let mut rng = StdRng::seed_from_u64(7);
        let ticket = issue_ticket(&ReservationLedger::default(), noon(), &mut rng);
        assert_eq!(ticket.id, "r20240502T120000000Z");
        assert_eq!(ticket.requested_at, "2024-05-02T12:00:00.000Z");
        assert_eq!(ticket.code.len(), ACCESS_CODE_LENGTH);
        assert!(ticket
            .code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn identifiers_skip_ones_already_in_the_ledger() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ledger = ReservationLedger::default();
        let first = issue_ticket(&ledger, noon(), &mut rng);
        let request = ReservationRequest {
            room_key: RoomKey::Sala1,
            seat_row: 0,
            seat_col: 0,
        };
        let _ = ledger.submit(request, "Ana", first).expect("submit");

        let second = issue_ticket(&ledger, noon(), &mut rng);
        assert_eq!(second.id, "r20240502T120000000Z-2");
    }
}
