//! Reservation ledger.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::ReservationId;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use snapshot_store::Version;
use tracing::warn;

use super::{Reservation, ReservationError};

/// All reservations ever committed, keyed by id. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: HashMap<ReservationId, Reservation>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly committed reservation.
    pub fn insert(&mut self, reservation: Reservation) {
        self.entries
            .insert(reservation.reservation_id(), reservation);
    }

    pub fn get(&self, reservation_id: &ReservationId) -> Option<&Reservation> {
        self.entries.get(reservation_id)
    }

    /// Returns the reservation only if it is still confirmed.
    pub fn confirmed(&self, reservation_id: &ReservationId) -> Option<&Reservation> {
        self.get(reservation_id).filter(|r| r.is_confirmed())
    }

    /// Marks a confirmed reservation cancelled at `committed_version`.
    pub fn cancel(
        &mut self,
        reservation_id: &ReservationId,
        committed_version: Version,
        cancelled_at: DateTime<Utc>,
    ) -> Result<&Reservation, ReservationError> {
        let reservation = self
            .entries
            .get_mut(reservation_id)
            .ok_or_else(|| ReservationError::not_found(reservation_id))?;
        reservation.cancel(committed_version, cancelled_at)?;
        Ok(&*reservation)
    }

    /// Total seats held by confirmed reservations.
    pub fn confirmed_seats(&self) -> u64 {
        self.entries
            .values()
            .filter(|r| r.is_confirmed())
            .map(|r| u64::from(r.seats()))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.entries.values()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Readable(Reservation),
    Unreadable(IgnoredAny),
}

/// Reads the persisted map leniently: one damaged entry must not cost the
/// whole document. Entries are keyed by the id inside the record, and
/// records that do not parse are dropped with a warning.
impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = HashMap::<String, StoredEntry>::deserialize(deserializer)?;

        let mut ledger = Ledger::new();
        for (key, entry) in stored {
            match entry {
                StoredEntry::Readable(reservation) => {
                    if key != reservation.reservation_id().to_string() {
                        warn!(
                            key = %key,
                            reservation_id = %reservation.reservation_id(),
                            "ledger key does not match its record, using the record's id"
                        );
                    }
                    ledger.insert(reservation);
                }
                StoredEntry::Unreadable(_) => {
                    warn!(key = %key, "skipping unreadable ledger entry");
                }
            }
        }
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use common::PartnerId;

    use super::*;

    fn confirmed(seats: u32, version: u64) -> Reservation {
        Reservation::confirmed(
            ReservationId::new(),
            PartnerId::new("partner"),
            seats,
            Version::new(version),
            Utc::now(),
        )
    }

    #[test]
    fn confirmed_seats_ignores_cancelled_entries() {
        let mut ledger = Ledger::new();
        let a = confirmed(3, 1);
        let b = confirmed(4, 2);
        let b_id = b.reservation_id();
        ledger.insert(a);
        ledger.insert(b);

        ledger.cancel(&b_id, Version::new(3), Utc::now()).unwrap();

        assert_eq!(ledger.confirmed_seats(), 3);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.confirmed(&b_id).is_none());
        assert!(ledger.get(&b_id).is_some());
    }

    #[test]
    fn cancel_unknown_id_is_not_found() {
        let mut ledger = Ledger::new();
        let result = ledger.cancel(&ReservationId::new(), Version::new(1), Utc::now());
        assert!(matches!(result, Err(ReservationError::NotFound { .. })));
    }

    #[test]
    fn serializes_as_map_keyed_by_reservation_id() {
        let mut ledger = Ledger::new();
        let r = confirmed(1, 1);
        let id = r.reservation_id();
        ledger.insert(r);

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json[id.to_string()]["reservationId"], id.to_string());

        let back: Ledger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn malformed_key_is_rekeyed_by_record_id() {
        let raw = r#"{
            "legacy-entry-1": {
                "reservationId": "0b6f7f5e-3a43-4b8e-9f0a-3b6c2a3b9f11",
                "partnerId": "abc-corp",
                "seats": 2,
                "status": "confirmed",
                "createdAt": "2025-01-01T10:00:00Z",
                "eventVersionAtReservation": 1
            }
        }"#;

        let ledger: Ledger = serde_json::from_str(raw).unwrap();

        let id: ReservationId = "0b6f7f5e-3a43-4b8e-9f0a-3b6c2a3b9f11".parse().unwrap();
        assert_eq!(ledger.confirmed(&id).unwrap().seats(), 2);
    }

    #[test]
    fn unreadable_entries_are_skipped() {
        let raw = r#"{
            "0b6f7f5e-3a43-4b8e-9f0a-3b6c2a3b9f11": {
                "reservationId": "0b6f7f5e-3a43-4b8e-9f0a-3b6c2a3b9f11",
                "partnerId": "abc-corp",
                "seats": 2,
                "status": "confirmed",
                "createdAt": "2025-01-01T10:00:00Z",
                "eventVersionAtReservation": 1
            },
            "not-a-reservation": { "seats": "many" },
            "also-broken": 42
        }"#;

        let ledger: Ledger = serde_json::from_str(raw).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.confirmed_seats(), 2);
    }

    #[test]
    fn non_object_ledger_is_still_an_error() {
        assert!(serde_json::from_str::<Ledger>("[1, 2]").is_err());
    }
}
