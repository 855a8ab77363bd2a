use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::response::success;

pub mod analytics;
pub mod bookings;
pub mod events;
pub mod preferences;
pub mod public;
pub mod venues;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    backend: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "eventhub-server",
        backend: if state.config.backend_url.is_some() {
            "frappe"
        } else {
            "memory"
        },
    };

    success(payload, "Health check successful")
}
