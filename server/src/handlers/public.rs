//! Public discovery site: browse the catalog and book tickets.

use axum::extract::{Path, Query, State};
use axum::response::Response;

use chrono::Local;
use serde::Deserialize;

use crate::models::NewBooking;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, success};

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
}

/// GET /api/public/events?search=
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, AppError> {
    let catalog = state
        .catalog
        .discover(query.search.as_deref())
        .await
        .map_err(AppError::from_fetch)?;

    let message = match catalog.events.len() {
        1 => "1 event found".to_string(),
        n => format!("{n} events found"),
    };
    Ok(success(catalog, message))
}

/// POST /api/public/events/:id/bookings
pub async fn book_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<NewBooking>,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let booking = state
        .bookings
        .submit_public(&event_id, &request, today)
        .await?;

    Ok(created(booking, "Booking successful!"))
}
