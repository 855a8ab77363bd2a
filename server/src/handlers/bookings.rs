//! Management console: bookings and their status workflow.

use axum::extract::{Path, Query, State};
use axum::response::Response;

use chrono::Local;
use serde::Deserialize;

use crate::models::{BookingStatus, NewBooking};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};
use crate::validation::FieldErrors;

#[derive(Debug, Default, Deserialize)]
pub struct BookingsQuery {
    /// `Pending`, `Confirmed`, `Cancelled`, or `All`/absent for no filter.
    pub status: Option<String>,
}

impl BookingsQuery {
    fn status_filter(&self) -> Result<Option<BookingStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("All") => Ok(None),
            Some(raw) => serde_json::from_value(serde_json::Value::String(raw.to_string()))
                .map(Some)
                .map_err(|_| {
                    AppError::ValidationError(FieldErrors::single(
                        "status",
                        format!("Unknown booking status '{raw}'"),
                    ))
                }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBooking {
    pub event: String,
    #[serde(flatten)]
    pub booking: NewBooking,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: BookingStatus,
}

/// GET /api/management/bookings?status=
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingsQuery>,
) -> Result<Response, AppError> {
    let status = query.status_filter()?;
    let bookings = state
        .bookings
        .list(status)
        .await
        .map_err(AppError::from_fetch)?;

    Ok(success(bookings, "Bookings retrieved"))
}

/// POST /api/management/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let booking = state
        .bookings
        .create_pending(&input.event, &input.booking, today)
        .await?;

    Ok(created(booking, "Booking created"))
}

/// POST /api/management/bookings/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Response, AppError> {
    let booking = state.bookings.transition(&id, change.status).await?;
    Ok(success(booking, format!("Booking {}", change.status.as_str().to_lowercase())))
}

/// DELETE /api/management/bookings/:id
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.bookings.delete(&id).await?;
    Ok(empty_success("Booking deleted"))
}
