//! HTTP-level tests for the gateway, driven through the full router and
//! middleware stack over the in-memory backend.

mod common;

use axum::http::StatusCode;
use common::{body_json, booking_body, build_test_app};
use serde_json::json;

// ---------------------------------------------------------------------------
// Health and middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = build_test_app().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let app = build_test_app().await;

    let response = app.get("/health").await;
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.get("strict-transport-security").is_none());
    assert!(headers.get("x-request-id").is_some(), "request id must be echoed");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = build_test_app().await;
    let response = app.get("/api/nothing-here").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Public discovery and booking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_public_booking_adds_confirmed_row() {
    let app = build_test_app().await;
    let venue = app.create_venue("Main Hall").await;
    let event = app.create_event("Rust Meetup", &venue).await;

    let before = body_json(app.get("/api/management/bookings?status=Confirmed").await).await;
    assert_eq!(before["data"]["records"].as_array().unwrap().len(), 0);

    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            booking_body("Al", 1),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Booking successful!");
    assert_eq!(json["data"]["status"], "Confirmed");
    assert_eq!(json["data"]["event"], event.as_str());

    let after = body_json(app.get("/api/management/bookings?status=Confirmed").await).await;
    let rows = after["data"]["records"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["event"], event.as_str());
}

#[tokio::test]
async fn test_short_name_rejected_without_backend_write() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;
    let writes_before = app.backend.write_count();

    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            booking_body("A", 1),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["details"]["attendee_name"].is_string());
    assert_eq!(app.backend.write_count(), writes_before);
}

#[tokio::test]
async fn test_ticket_bounds() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;
    let uri = format!("/api/public/events/{event}/bookings");

    for tickets in [0, 11] {
        let response = app.post_json(&uri, booking_body("Alice", tickets)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{tickets} tickets");
    }
    for tickets in [1, 10] {
        let response = app.post_json(&uri, booking_body("Alice", tickets)).await;
        assert_eq!(response.status(), StatusCode::CREATED, "{tickets} tickets");
    }
}

#[tokio::test]
async fn test_public_booking_requires_phone() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;

    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            json!({ "attendee_name": "Alice", "email": "a@b.com", "number_of_tickets": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]["details"]["phone"].is_string());
}

#[tokio::test]
async fn test_booking_missing_ticket_count_uses_error_envelope() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;
    let writes_before = app.backend.write_count();

    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            json!({ "attendee_name": "Alice", "email": "a@b.com", "phone": "1234567890" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["details"]["number_of_tickets"],
        "This field is required"
    );
    assert_eq!(app.backend.write_count(), writes_before);
}

#[tokio::test]
async fn test_booking_ticket_count_as_string_names_the_field() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;

    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            json!({
                "attendee_name": "Alice",
                "email": "a@b.com",
                "phone": "1234567890",
                "number_of_tickets": "2",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["details"]["number_of_tickets"].is_string());
}

#[tokio::test]
async fn test_unparseable_body_uses_error_envelope() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;

    let response = app
        .post_raw(&format!("/api/public/events/{event}/bookings"), "{\"attendee_name\":")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["details"]["body"].is_string());
}

#[tokio::test]
async fn test_booking_unknown_event_is_rejected_by_backend() {
    let app = build_test_app().await;

    let response = app
        .post_json("/api/public/events/missing/bookings", booking_body("Alice", 1))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "REJECTED");
    assert_eq!(json["error"]["message"], "Could not find Event: missing");
}

#[tokio::test]
async fn test_booking_backend_outage_is_generic() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;

    app.backend.fail_next_writes(1);
    let response = app
        .post_json(
            &format!("/api/public/events/{event}/bookings"),
            booking_body("Alice", 1),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "EXTERNAL_SERVICE_ERROR");
    assert_eq!(json["error"]["message"], "Booking failed. Please try again.");
}

#[tokio::test]
async fn test_catalog_search_and_deleted_venue() {
    let app = build_test_app().await;
    let venue = app.create_venue("Main Hall").await;
    app.create_event("Rust Meetup", &venue).await;
    app.create_event("Jazz Night", "VEN-404").await;

    let json = body_json(app.get("/api/public/events").await).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["message"], "2 events found");

    let json = body_json(app.get("/api/public/events?search=main").await).await;
    let events = json["data"]["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Rust Meetup");
    assert_eq!(events[0]["venue_name"], "Main Hall");

    let response = app.delete(&format!("/api/management/venues/{venue}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(app.get("/api/public/events?search=rust").await).await;
    let events = json["data"]["events"].as_array().unwrap();
    assert_eq!(events[0]["venue_name"], venue.as_str());

    let json = body_json(app.get("/api/public/events?search=jazz").await).await;
    assert_eq!(json["data"]["events"][0]["venue_name"], "VEN-404");
}

#[tokio::test]
async fn test_catalog_survives_one_failed_read() {
    let app = build_test_app().await;
    app.create_event("Rust Meetup", "VEN-1").await;

    app.backend.fail_next_reads(1);
    let response = app.get("/api/public/events").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total"], 1);
}

#[tokio::test]
async fn test_catalog_reports_retry_failure() {
    let app = build_test_app().await;

    app.backend.fail_next_reads(4);
    let response = app.get("/api/public/events").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Retry: "), "{message}");
}

// ---------------------------------------------------------------------------
// Management
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_event_date_order_rejected() {
    let app = build_test_app().await;

    let response = app
        .post_json(
            "/api/management/events",
            json!({ "event_name": "Festival", "start_date": "2025-05-10", "end_date": "2025-05-01" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(
        json["error"]["details"]["end_date"],
        "End Date must be after Start Date"
    );
}

#[tokio::test]
async fn test_event_requires_venue() {
    let app = build_test_app().await;

    let response = app
        .post_json("/api/management/events", json!({ "event_name": "No venue" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["details"]["venue"], "Please select a Venue");
    assert_eq!(app.backend.write_count(), 0);
}

#[tokio::test]
async fn test_event_crud_round() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;
    let uri = format!("/api/management/events/{event}");

    let json = body_json(app.get(&uri).await).await;
    assert_eq!(json["data"]["status"], "Draft");

    let response = app.put_json(&uri, json!({ "status": "Approved" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "Approved");

    let response = app.put_json(&uri, json!({ "capacity": 0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.delete(&uri).await.status(), StatusCode::OK);
    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_venue_capacity_bounds() {
    let app = build_test_app().await;

    let response = app
        .post_json(
            "/api/management/venues",
            json!({ "venue_name": "Annex", "capacity": 0 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"]["details"]["capacity"],
        "Capacity must be greater than 0"
    );

    let response = app
        .post_json(
            "/api/management/venues",
            json!({ "venue_name": "Annex", "capacity": 1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_status_workflow() {
    let app = build_test_app().await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;

    let mut body = booking_body("Bo", 2);
    body["event"] = json!(event);
    let response = app.post_json("/api/management/bookings", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Pending");
    let id = json["data"]["name"].as_str().unwrap().to_string();
    let status_uri = format!("/api/management/bookings/{id}/status");

    let response = app.post_json(&status_uri, json!({ "status": "Confirmed" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "Confirmed");

    let response = app.post_json(&status_uri, json!({ "status": "Pending" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
    assert_eq!(
        json["error"]["message"],
        "Cannot move booking from Confirmed to Pending"
    );

    let response = app.delete(&format!("/api/management/bookings/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(app.get("/api/management/bookings").await).await;
    assert!(json["data"]["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bookings_reject_unknown_status_filter() {
    let app = build_test_app().await;
    let response = app.get("/api/management/bookings?status=Archived").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/management/bookings?status=All").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_analytics_counts() {
    let app = build_test_app().await;
    app.create_venue("Main Hall").await;
    let event = app.create_event("Rust Meetup", "VEN-1").await;
    app.put_json(
        &format!("/api/management/events/{event}"),
        json!({ "status": "Approved" }),
    )
    .await;
    app.create_event("Jazz Night", "VEN-1").await;
    app.post_json(
        &format!("/api/public/events/{event}/bookings"),
        booking_body("Al", 3),
    )
    .await;

    let response = app.get("/api/management/analytics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    assert_eq!(data["total_events"], 2);
    assert_eq!(data["approved_events"], 1);
    assert_eq!(data["approval_rate"], 50);
    assert_eq!(data["total_bookings"], 1);
    assert_eq!(data["confirmed_bookings"], 1);
    assert_eq!(data["confirmation_rate"], 100);
    assert_eq!(data["total_tickets"], 3);
    assert_eq!(data["total_venues"], 1);
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_preferences_round_trip() {
    let app = build_test_app().await;

    let json = body_json(app.get("/api/preferences").await).await;
    assert_eq!(json["data"]["current_interface"], "public");
    assert_eq!(json["data"]["theme"], "light");
    assert_eq!(json["data"]["language"], "en");

    let response = app.put_json("/api/preferences", json!({ "theme": "dark" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json("/api/preferences/interface", json!({ "interface": "management" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(app.get("/api/preferences").await).await;
    assert_eq!(json["data"]["current_interface"], "management");
    assert_eq!(json["data"]["theme"], "dark");
    assert_eq!(json["data"]["language"], "en");
}
