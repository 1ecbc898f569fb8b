//! Identifier types shared across the seat reservation crates.

mod types;

pub use types::{EventId, PartnerId, ReservationId};
