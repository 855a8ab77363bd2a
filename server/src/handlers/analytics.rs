use axum::extract::State;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// GET /api/management/analytics
pub async fn dashboard(State(state): State<AppState>) -> Result<Response, AppError> {
    let analytics = state
        .management
        .analytics()
        .await
        .map_err(AppError::from_fetch)?;

    Ok(success(analytics, "Analytics computed"))
}
