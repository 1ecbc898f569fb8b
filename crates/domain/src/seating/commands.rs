//! Reservation commands.

use common::{PartnerId, ReservationId};

use super::ReservationError;

/// Largest number of seats a single reservation may hold.
pub const MAX_SEATS_PER_RESERVATION: u32 = 10;

/// Command to reserve seats for a partner.
///
/// Can only be built through [`ReserveSeats::new`], which enforces the
/// input contract.
#[derive(Debug, Clone)]
pub struct ReserveSeats {
    partner_id: PartnerId,
    seats: u32,
}

impl ReserveSeats {
    /// Validates and builds a reservation request.
    ///
    /// `partner_id` must be non-empty and `seats` within
    /// `1..=MAX_SEATS_PER_RESERVATION`.
    pub fn new(partner_id: impl Into<String>, seats: i64) -> Result<Self, ReservationError> {
        let partner_id = partner_id.into();
        if partner_id.is_empty() {
            return Err(ReservationError::InvalidInput(
                "partnerId (string) is required".to_string(),
            ));
        }

        let seats = u32::try_from(seats)
            .ok()
            .filter(|s| (1..=MAX_SEATS_PER_RESERVATION).contains(s))
            .ok_or_else(|| {
                ReservationError::InvalidInput(format!(
                    "seats must be between 1 and {MAX_SEATS_PER_RESERVATION}"
                ))
            })?;

        Ok(Self {
            partner_id: PartnerId::new(partner_id),
            seats,
        })
    }

    pub fn partner_id(&self) -> &PartnerId {
        &self.partner_id
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }
}

/// Command to cancel a confirmed reservation.
#[derive(Debug, Clone, Copy)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
}

impl CancelReservation {
    pub fn new(reservation_id: ReservationId) -> Self {
        Self { reservation_id }
    }

    /// Parses a caller-supplied id. Anything that is not a reservation id
    /// cannot name an existing reservation, so it is reported as `NotFound`.
    pub fn parse(raw: &str) -> Result<Self, ReservationError> {
        raw.parse()
            .map(Self::new)
            .map_err(|_| ReservationError::not_found(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_of_seat_range() {
        assert_eq!(ReserveSeats::new("p1", 1).unwrap().seats(), 1);
        assert_eq!(
            ReserveSeats::new("p1", 10).unwrap().seats(),
            MAX_SEATS_PER_RESERVATION
        );
    }

    #[test]
    fn rejects_seats_outside_range() {
        for seats in [0, -1, 11, i64::MAX] {
            let result = ReserveSeats::new("p1", seats);
            assert!(
                matches!(result, Err(ReservationError::InvalidInput(_))),
                "seats = {seats}"
            );
        }
    }

    #[test]
    fn rejects_empty_partner() {
        let result = ReserveSeats::new("", 2);
        assert!(matches!(result, Err(ReservationError::InvalidInput(msg)) if msg.contains("partnerId")));
    }

    #[test]
    fn cancel_parse_round_trips_display() {
        let id = ReservationId::new();
        assert_eq!(
            CancelReservation::parse(&id.to_string()).unwrap().reservation_id,
            id
        );
    }

    #[test]
    fn cancel_parse_garbage_is_not_found() {
        let result = CancelReservation::parse("nope");
        assert!(matches!(
            result,
            Err(ReservationError::NotFound { reservation_id }) if reservation_id == "nope"
        ));
    }
}
