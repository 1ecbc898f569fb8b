//! Seat reservation service.

use chrono::Utc;
use common::ReservationId;
use snapshot_store::SnapshotStore;
use tracing::info;

use crate::aggregate::Versioned;
use crate::cas::CasEngine;

use super::{
    CancelReservation, EventView, ReloadOutcome, Reservation, ReservationError,
    ReservationStatus, ReservationSummary, ReserveSeats, SeatStore, SeatingDocument,
};

/// Orchestrates reload → CAS commit of the whole document for the two
/// business operations, and serves read-only queries.
pub struct SeatReservationService<S> {
    store: SeatStore<S>,
    cas: CasEngine,
}

impl<S> SeatReservationService<S>
where
    S: SnapshotStore<SeatingDocument>,
{
    /// Creates a service over an already loaded store.
    pub fn new(store: SeatStore<S>) -> Self {
        Self {
            store,
            cas: CasEngine::default(),
        }
    }

    /// Loads (or seeds) the store from `backend` and wraps it in a service.
    pub async fn open(backend: S) -> Result<Self, ReservationError> {
        Ok(Self::new(SeatStore::load(backend).await?))
    }

    /// Replaces the CAS engine, e.g. to change the attempt bound.
    pub fn with_cas_engine(mut self, cas: CasEngine) -> Self {
        self.cas = cas;
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &SeatStore<S> {
        &self.store
    }

    /// Reserves seats for a partner.
    ///
    /// The seat deduction and the new ledger entry are committed in one
    /// write. The id is drawn once per request but only becomes visible if
    /// that commit succeeds.
    #[tracing::instrument(skip(self, cmd), fields(partner_id = %cmd.partner_id(), seats = cmd.seats()))]
    pub async fn reserve(&self, cmd: ReserveSeats) -> Result<ReservationSummary, ReservationError> {
        self.store.reload().await;

        let seats = cmd.seats();
        let reservation_id = ReservationId::new();
        let committed = self
            .cas
            .try_update(&self.store, |document: &SeatingDocument| {
                document.reserve(seats, |event| {
                    Reservation::confirmed(
                        reservation_id,
                        cmd.partner_id().clone(),
                        seats,
                        event.version(),
                        Utc::now(),
                    )
                })
            })
            .await
            .map_err(|e| rejected(e.into()))?;

        metrics::counter!("reservations_created_total").increment(1);
        info!(
            %reservation_id,
            version = %committed.version(),
            available = committed.event.available_seats(),
            "reservation confirmed"
        );

        Ok(ReservationSummary {
            reservation_id,
            seats,
            status: ReservationStatus::Confirmed,
            event_version: committed.version(),
        })
    }

    /// Cancels a confirmed reservation and returns its seats to the pool.
    ///
    /// Two cancels of the same reservation race on the document version;
    /// the loser retries against the cancelled record and gets `NotFound`.
    #[tracing::instrument(skip(self), fields(reservation_id = %cmd.reservation_id))]
    pub async fn cancel(&self, cmd: CancelReservation) -> Result<(), ReservationError> {
        let reservation_id = cmd.reservation_id;
        self.store.reload().await;

        let committed = self
            .cas
            .try_update(&self.store, |document: &SeatingDocument| {
                document.cancel(&reservation_id, Utc::now())
            })
            .await
            .map_err(|e| rejected(e.into()))?;

        metrics::counter!("reservations_cancelled_total").increment(1);
        info!(
            version = %committed.version(),
            available = committed.event.available_seats(),
            "reservation cancelled"
        );

        Ok(())
    }

    /// Returns the current event state without reloading.
    pub async fn event_snapshot(&self) -> EventView {
        self.store.event().await.view()
    }

    /// Returns every reservation in memory, in no particular order, without reloading.
    pub async fn list_reservations(&self) -> Vec<Reservation> {
        self.store.reservations().await
    }

    /// Pulls in persisted changes made by other instances.
    pub async fn refresh(&self) -> ReloadOutcome {
        self.store.reload().await
    }
}

fn rejected(e: ReservationError) -> ReservationError {
    metrics::counter!("reservations_rejected_total", "reason" => e.kind()).increment(1);
    e
}
