//! HTTP route handlers.

pub mod event;
pub mod health;
pub mod metrics;
pub mod reservations;
