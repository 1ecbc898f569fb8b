//! Event summary endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::{EventView, SeatingDocument};
use snapshot_store::SnapshotStore;

use super::reservations::AppState;

/// GET /event — returns the current seat counts and version.
pub async fn get<S: SnapshotStore<SeatingDocument> + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<EventView> {
    Json(state.service.event_snapshot().await)
}
