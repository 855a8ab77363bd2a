use axum::http::HeaderName;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{analytics, bookings, events, health_check, preferences, public, venues};
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(public::list_events))
        .route("/events/:id/bookings", post(public::book_event))
}

fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route(
            "/venues/:id",
            get(venues::get_venue)
                .put(venues::update_venue)
                .delete(venues::delete_venue),
        )
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/bookings/:id", delete(bookings::delete_booking))
        .route("/bookings/:id/status", post(bookings::change_status))
        .route("/analytics", get(analytics::dashboard))
}

fn preference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .route("/api/preferences/interface", put(preferences::switch_interface))
}

pub fn create_routes(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let cors = create_cors_layer(&state.config.cors_origins);
    let production = state.config.production;

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/public", public_routes())
        .nest("/api/management", management_routes())
        .merge(preference_routes())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    apply_security_headers(router, production)
}
