use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a reservation.
///
/// Assigned exactly once, when the reservation's seat deduction commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random reservation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a reservation ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReservationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for ReservationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ReservationId> for Uuid {
    fn from(id: ReservationId) -> Self {
        id.0
    }
}

/// Opaque identifier of the partner requesting seats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(String);

impl PartnerId {
    /// Creates a partner ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the partner ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PartnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PartnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Stable identifier of the ticketed event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an event ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the event ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_id_new_creates_unique_ids() {
        let id1 = ReservationId::new();
        let id2 = ReservationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn reservation_id_parses_its_display_form() {
        let id = ReservationId::new();
        let parsed: ReservationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn reservation_id_rejects_garbage() {
        assert!("not-a-reservation".parse::<ReservationId>().is_err());
    }

    #[test]
    fn reservation_id_serializes_as_plain_string() {
        let uuid = Uuid::new_v4();
        let id = ReservationId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn partner_id_is_transparent() {
        let partner = PartnerId::new("partner-7");
        assert_eq!(serde_json::to_string(&partner).unwrap(), "\"partner-7\"");
        assert_eq!(partner.as_str(), "partner-7");
    }
}
