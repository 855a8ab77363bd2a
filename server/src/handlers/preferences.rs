use axum::extract::State;
use axum::response::Response;

use serde::Deserialize;

use crate::models::{Interface, PreferencesPatch};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::Json;
use crate::utils::response::success;

/// GET /api/preferences
pub async fn get_preferences(State(state): State<AppState>) -> Response {
    success(state.preferences.get().await, "Preferences retrieved")
}

/// PUT /api/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(patch): Json<PreferencesPatch>,
) -> Result<Response, AppError> {
    let prefs = state.preferences.update(patch).await?;
    tracing::info!(
        interface = ?prefs.current_interface,
        theme = ?prefs.theme,
        language = %prefs.language,
        "Preferences updated"
    );
    Ok(success(prefs, "Preferences updated"))
}

#[derive(Debug, Deserialize)]
pub struct InterfaceSwitch {
    pub interface: Interface,
}

/// PUT /api/preferences/interface
pub async fn switch_interface(
    State(state): State<AppState>,
    Json(switch): Json<InterfaceSwitch>,
) -> Result<Response, AppError> {
    let prefs = state.preferences.set_interface(switch.interface).await?;
    Ok(success(prefs, "Interface switched"))
}
