//! The event aggregate: the versioned seat count everything else hangs off.

use common::EventId;
use serde::{Deserialize, Serialize};
use snapshot_store::Version;
use thiserror::Error;

use crate::aggregate::Versioned;

use super::ReservationError;

const SEED_EVENT_ID: &str = "node-meetup-2025";
const SEED_EVENT_NAME: &str = "Node.js Meet-up";
const SEED_TOTAL_SEATS: u32 = 500;

/// A seat count that broke `0 <= available <= total`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("available seats {available} outside of 0..={total}")]
pub struct InvariantViolation {
    pub total: u32,
    pub available: u32,
}

/// Event aggregate root.
///
/// `event_id`, `name` and `total_seats` never change after creation;
/// `available_seats` only changes through committed CAS updates, each of
/// which advances `version` by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAggregate {
    event_id: EventId,
    name: String,
    total_seats: u32,
    available_seats: u32,
    #[serde(default)]
    version: Version,
}

impl Versioned for EventAggregate {
    fn version(&self) -> Version {
        self.version
    }
}

impl EventAggregate {
    /// The event every fresh dataset starts with.
    pub fn seed() -> Self {
        Self {
            event_id: EventId::new(SEED_EVENT_ID),
            name: SEED_EVENT_NAME.to_string(),
            total_seats: SEED_TOTAL_SEATS,
            available_seats: SEED_TOTAL_SEATS,
            version: Version::initial(),
        }
    }

    /// Checks `0 <= available_seats <= total_seats`.
    ///
    /// The lower bound is enforced by the type; deserialized data can still
    /// break the upper one.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.available_seats > self.total_seats {
            return Err(InvariantViolation {
                total: self.total_seats,
                available: self.available_seats,
            });
        }
        Ok(())
    }
}

// Query methods
impl EventAggregate {
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn available_seats(&self) -> u32 {
        self.available_seats
    }

    /// Returns the number of seats currently held by confirmed reservations.
    pub fn seats_reserved(&self) -> u32 {
        self.total_seats.saturating_sub(self.available_seats)
    }

    /// Returns the read-only view exposed to callers.
    pub fn view(&self) -> EventView {
        EventView {
            event_id: self.event_id.clone(),
            name: self.name.clone(),
            total_seats: self.total_seats,
            available_seats: self.available_seats,
            reservation_count: self.seats_reserved(),
            version: self.version,
        }
    }
}

// Updaters (pure; return the proposed next state)
impl EventAggregate {
    /// Proposes taking `seats` out of the pool.
    pub fn reserve(&self, seats: u32) -> Result<Self, ReservationError> {
        if self.available_seats < seats {
            return Err(ReservationError::InsufficientSeats {
                requested: seats,
                available: self.available_seats,
            });
        }

        Ok(Self {
            available_seats: self.available_seats - seats,
            version: self.version.next(),
            ..self.clone()
        })
    }

    /// Proposes returning `seats` to the pool.
    ///
    /// Clamped at `total_seats` so a duplicate release can never mint seats.
    pub fn release(&self, seats: u32) -> Self {
        Self {
            available_seats: self
                .available_seats
                .saturating_add(seats)
                .min(self.total_seats),
            version: self.version.next(),
            ..self.clone()
        }
    }
}

/// Read-only projection of the event returned by snapshot queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub event_id: EventId,
    pub name: String,
    pub total_seats: u32,
    pub available_seats: u32,
    /// Seats currently held (`total_seats - available_seats`).
    pub reservation_count: u32,
    pub version: Version,
}
