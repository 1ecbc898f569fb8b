use chrono::{DateTime, Utc};
use common::ReservationId;
use serde::{Deserialize, Serialize};
use snapshot_store::Version;

use crate::aggregate::Versioned;

use super::{EventAggregate, InvariantViolation, Ledger, Reservation, ReservationError};

/// The persisted aggregate root: one event plus its reservation ledger.
///
/// Event and ledger are committed together, so a persisted document always
/// satisfies `total - available == confirmed seats` when its history did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatingDocument {
    pub event: EventAggregate,
    #[serde(default)]
    pub reservations: Ledger,
}

impl Versioned for SeatingDocument {
    fn version(&self) -> Version {
        self.event.version()
    }
}

impl SeatingDocument {
    /// Default event state with an empty ledger.
    pub fn seed() -> Self {
        Self {
            event: EventAggregate::seed(),
            reservations: Ledger::new(),
        }
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.event.validate()
    }

    /// Proposes taking `seats` out of the pool for a new reservation.
    ///
    /// `new_reservation` is only called once the deduction is known to fit
    /// and receives the proposed event, whose version the record is
    /// stamped with.
    pub fn reserve(
        &self,
        seats: u32,
        new_reservation: impl FnOnce(&EventAggregate) -> Reservation,
    ) -> Result<Self, ReservationError> {
        let event = self.event.reserve(seats)?;
        let mut reservations = self.reservations.clone();
        reservations.insert(new_reservation(&event));
        Ok(Self {
            event,
            reservations,
        })
    }

    /// Proposes cancelling a confirmed reservation and returning its seats.
    ///
    /// Fails with `NotFound` if the reservation is unknown or already
    /// cancelled in this snapshot.
    pub fn cancel(
        &self,
        reservation_id: &ReservationId,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Self, ReservationError> {
        let seats = self
            .reservations
            .confirmed(reservation_id)
            .ok_or_else(|| ReservationError::not_found(reservation_id))?
            .seats();

        let event = self.event.release(seats);
        let mut reservations = self.reservations.clone();
        reservations.cancel(reservation_id, event.version(), cancelled_at)?;
        Ok(Self {
            event,
            reservations,
        })
    }
}
