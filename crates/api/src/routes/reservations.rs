//! Reservation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{
    CancelReservation, Reservation, ReservationSummary, ReserveSeats, SeatReservationService,
    SeatingDocument,
};
use serde_json::Value;
use snapshot_store::SnapshotStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub service: SeatReservationService<S>,
}

/// POST /reservations — reserve seats for a partner.
///
/// The body is taken as raw JSON so that type errors in `partnerId` or
/// `seats` come back as 400 with a field-specific message.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: SnapshotStore<SeatingDocument> + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ReservationSummary>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let partner_id = body
        .get("partnerId")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("partnerId (string) is required".to_string()))?;
    let seats = body
        .get("seats")
        .and_then(integer)
        .ok_or_else(|| ApiError::BadRequest("seats must be an integer".to_string()))?;

    let cmd = ReserveSeats::new(partner_id, seats)?;
    let summary = state.service.reserve(cmd).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /reservations/:id — cancel a confirmed reservation.
///
/// Unknown, already cancelled and malformed ids all answer 404. A cancel
/// that keeps losing the version race answers 409 like a reserve conflict
/// does, not 500: nothing was changed and the request can be retried.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: SnapshotStore<SeatingDocument> + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let cmd = CancelReservation::parse(&id)?;
    state.service.cancel(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /reservations — list every reservation, cancelled ones included.
pub async fn list<S: SnapshotStore<SeatingDocument> + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<Reservation>> {
    Json(state.service.list_reservations().await)
}

/// Accepts JSON numbers with no fractional part, so `2.0` counts as `2`.
/// Out-of-range magnitudes saturate and are caught by the seat bounds.
fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn integer_accepts_whole_numbers_only() {
        assert_eq!(integer(&json!(3)), Some(3));
        assert_eq!(integer(&json!(-2)), Some(-2));
        assert_eq!(integer(&json!(4.0)), Some(4));
        assert_eq!(integer(&json!(2.5)), None);
        assert_eq!(integer(&json!("3")), None);
        assert_eq!(integer(&json!(null)), None);
    }

    #[test]
    fn integer_saturates_huge_values() {
        assert_eq!(integer(&json!(u64::MAX)), Some(i64::MAX));
    }
}
