//! Domain layer for the seat reservation system.
//!
//! This crate provides:
//! - Versioned trait for aggregates guarded by optimistic concurrency
//! - A bounded-retry compare-and-swap engine
//! - The seating aggregate, reservation ledger and reservation service

pub mod aggregate;
pub mod cas;
pub mod seating;

pub use aggregate::Versioned;
pub use cas::{CasEngine, CasError, CasTarget, MAX_CAS_ATTEMPTS};
pub use seating::{
    CancelReservation, EventAggregate, EventView, InvariantViolation, Ledger,
    MAX_SEATS_PER_RESERVATION, ReloadOutcome, Reservation, ReservationError, ReservationStatus,
    ReservationSummary, ReserveSeats, SeatReservationService, SeatStore, SeatingDocument,
};
