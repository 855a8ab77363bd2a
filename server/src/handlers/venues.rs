//! Management console: venues.

use axum::extract::{Path, State};
use axum::response::Response;

use crate::models::VenueInput;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::{created, empty_success, success};

pub async fn list_venues(State(state): State<AppState>) -> Result<Response, AppError> {
    let venues = state
        .management
        .list_venues()
        .await
        .map_err(AppError::from_fetch)?;
    Ok(success(venues, "Venues retrieved"))
}

pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let venue = state.management.get_venue(&id).await?;
    Ok(success(venue, "Venue retrieved"))
}

pub async fn create_venue(
    State(state): State<AppState>,
    Json(input): Json<VenueInput>,
) -> Result<Response, AppError> {
    let venue = state.management.create_venue(input).await?;
    Ok(created(venue, "Venue created"))
}

pub async fn update_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<VenueInput>,
) -> Result<Response, AppError> {
    let venue = state.management.update_venue(&id, input).await?;
    Ok(success(venue, "Venue updated"))
}

pub async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.management.delete_venue(&id).await?;
    Ok(empty_success("Venue deleted"))
}
