//! Seat inventory for a single ticketed event.

mod commands;
mod document;
mod event;
mod ledger;
mod reservation;
mod service;
mod store;

pub use commands::{CancelReservation, MAX_SEATS_PER_RESERVATION, ReserveSeats};
pub use document::SeatingDocument;
pub use event::{EventAggregate, EventView, InvariantViolation};
pub use ledger::Ledger;
pub use reservation::{Reservation, ReservationStatus, ReservationSummary};
pub use service::SeatReservationService;
pub use store::{ReloadOutcome, SeatStore};

use snapshot_store::StoreError;
use thiserror::Error;

use crate::cas::CasError;

/// Errors that can occur during reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The caller broke the operation's input contract.
    #[error("{0}")]
    InvalidInput(String),

    /// Not enough seats are left to satisfy the request.
    #[error("Not enough seats left: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: u32 },

    /// Concurrent updates kept winning; the caller may retry.
    #[error("Could not complete the update due to concurrent updates after {attempts} attempts. Please retry.")]
    Conflict { attempts: u32 },

    /// The reservation does not exist or was already cancelled.
    #[error("Reservation not found or already cancelled: {reservation_id}")]
    NotFound { reservation_id: String },

    /// The snapshot could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl ReservationError {
    pub(crate) fn not_found(reservation_id: impl ToString) -> Self {
        ReservationError::NotFound {
            reservation_id: reservation_id.to_string(),
        }
    }

    /// Returns a short, stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ReservationError::InvalidInput(_) => "invalid_input",
            ReservationError::InsufficientSeats { .. } => "insufficient_seats",
            ReservationError::Conflict { .. } => "conflict",
            ReservationError::NotFound { .. } => "not_found",
            ReservationError::Persistence(_) => "persistence",
        }
    }

    /// Returns true if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReservationError::Conflict { .. })
    }
}

impl From<CasError<ReservationError>> for ReservationError {
    fn from(e: CasError<ReservationError>) -> Self {
        match e {
            CasError::Rejected(inner) => inner,
            CasError::Conflict { attempts } => ReservationError::Conflict { attempts },
            CasError::Store(store) => ReservationError::Persistence(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_cas_error_unwraps_to_business_error() {
        let err = ReservationError::from(CasError::Rejected(
            ReservationError::InsufficientSeats {
                requested: 10,
                available: 2,
            },
        ));
        assert!(matches!(
            err,
            ReservationError::InsufficientSeats {
                requested: 10,
                available: 2
            }
        ));
    }

    #[test]
    fn cas_conflict_becomes_retryable_conflict() {
        let err = ReservationError::from(CasError::<ReservationError>::Conflict { attempts: 5 });
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "conflict");
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(!ReservationError::not_found("abc").is_retryable());
        assert!(!ReservationError::InvalidInput("bad".to_string()).is_retryable());
    }
}
