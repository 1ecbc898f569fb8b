//! HTTP API server with observability for the seat reservation system.
//!
//! Provides REST endpoints for reserving and cancelling seats, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use domain::{ReservationError, SeatReservationService, SeatingDocument};
use metrics_exporter_prometheus::PrometheusHandle;
use snapshot_store::SnapshotStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::reservations::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: SnapshotStore<SeatingDocument> + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::welcome))
        .route("/_health", get(routes::health::check))
        .route("/event", get(routes::event::get::<S>))
        .route("/reservations", post(routes::reservations::create::<S>))
        .route("/reservations", get(routes::reservations::list::<S>))
        .route(
            "/reservations/{id}",
            delete(routes::reservations::cancel::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Opens the reservation service over `backend`, loading or seeding the
/// persisted document.
pub async fn create_state<S: SnapshotStore<SeatingDocument> + 'static>(
    backend: S,
) -> Result<Arc<AppState<S>>, ReservationError> {
    let service = SeatReservationService::open(backend).await?;
    Ok(Arc::new(AppState { service }))
}
