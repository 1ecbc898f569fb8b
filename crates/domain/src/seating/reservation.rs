//! Reservation records.

use chrono::{DateTime, Utc};
use common::{PartnerId, ReservationId};
use serde::{Deserialize, Serialize};
use snapshot_store::Version;

use super::ReservationError;

/// Lifecycle of a reservation. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A committed claim on seats, stamped with the event versions that
/// created and (optionally) cancelled it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    reservation_id: ReservationId,
    partner_id: PartnerId,
    seats: u32,
    status: ReservationStatus,
    #[serde(alias = "ts")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cancelled_at: Option<DateTime<Utc>>,
    event_version_at_reservation: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_version_at_cancel: Option<Version>,
}

impl Reservation {
    /// Builds the record for a reservation whose seat deduction committed
    /// as `committed_version`.
    pub fn confirmed(
        reservation_id: ReservationId,
        partner_id: PartnerId,
        seats: u32,
        committed_version: Version,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reservation_id,
            partner_id,
            seats,
            status: ReservationStatus::Confirmed,
            created_at,
            cancelled_at: None,
            event_version_at_reservation: committed_version,
            event_version_at_cancel: None,
        }
    }

    /// Transitions the reservation to `Cancelled`.
    ///
    /// Fails with `NotFound` if it is already cancelled.
    pub fn cancel(
        &mut self,
        committed_version: Version,
        cancelled_at: DateTime<Utc>,
    ) -> Result<(), ReservationError> {
        if !self.is_confirmed() {
            return Err(ReservationError::not_found(self.reservation_id));
        }

        self.status = ReservationStatus::Cancelled;
        self.cancelled_at = Some(cancelled_at);
        self.event_version_at_cancel = Some(committed_version);
        Ok(())
    }

    pub fn reservation_id(&self) -> ReservationId {
        self.reservation_id
    }

    pub fn partner_id(&self) -> &PartnerId {
        &self.partner_id
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn event_version_at_reservation(&self) -> Version {
        self.event_version_at_reservation
    }

    pub fn event_version_at_cancel(&self) -> Option<Version> {
        self.event_version_at_cancel
    }
}

/// What a successful reservation reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub reservation_id: ReservationId,
    pub seats: u32,
    pub status: ReservationStatus,
    #[serde(skip)]
    pub event_version: Version,
}
