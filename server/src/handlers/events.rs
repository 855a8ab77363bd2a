//! Management console: events.

use axum::extract::{Path, Query, State};
use axum::response::Response;

use crate::handlers::public::CatalogQuery;
use crate::models::EventInput;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};

/// GET /api/management/events
///
/// Same listing as the public catalog (newest first, venue names joined in).
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, AppError> {
    let catalog = state
        .catalog
        .discover(query.search.as_deref())
        .await
        .map_err(AppError::from_fetch)?;

    Ok(success(catalog, "Events retrieved"))
}

/// GET /api/management/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event = state.management.get_event(&id).await?;
    Ok(success(event, "Event retrieved"))
}

/// POST /api/management/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    let event = state.management.create_event(input).await?;
    Ok(created(event, "Event created"))
}

/// PUT /api/management/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Response, AppError> {
    let event = state.management.update_event(&id, input).await?;
    Ok(success(event, "Event updated"))
}

/// DELETE /api/management/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.management.delete_event(&id).await?;
    Ok(empty_success("Event deleted"))
}
