//! Health check and welcome endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// GET /_health — returns liveness status.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// GET / — plain-text greeting.
pub async fn welcome() -> &'static str {
    "Welcome to TicketBoss API"
}
