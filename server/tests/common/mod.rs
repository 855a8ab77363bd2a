#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use eventhub_server::backend::InMemoryBackend;
use eventhub_server::config::Config;
use eventhub_server::preferences::PreferenceStore;
use eventhub_server::routes::create_routes;
use eventhub_server::state::AppState;

/// The full router over an in-memory backend, with preferences in a scratch
/// directory that lives as long as the harness.
pub struct TestApp {
    pub router: Router,
    pub backend: Arc<InMemoryBackend>,
    _dir: TempDir,
}

pub async fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::local(dir.path().join("preferences.json"));
    let preferences = PreferenceStore::load(config.preferences_path.clone()).await;
    let backend = Arc::new(InMemoryBackend::new());

    let state = AppState::new(config, backend.clone(), preferences);
    TestApp {
        router: create_routes(state),
        backend,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Posts `body` verbatim as JSON, for payloads that do not parse.
    pub async fn post_raw(&self, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.send(Method::DELETE, uri, None).await
    }

    /// Creates a venue through the management API and returns its id.
    pub async fn create_venue(&self, name: &str) -> String {
        let response = self
            .post_json(
                "/api/management/venues",
                json!({ "venue_name": name, "capacity": 300 }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"]["name"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Creates an event through the management API and returns its id.
    pub async fn create_event(&self, name: &str, venue: &str) -> String {
        let response = self
            .post_json(
                "/api/management/events",
                json!({
                    "event_name": name,
                    "start_date": "2025-05-01",
                    "end_date": "2025-05-02",
                    "capacity": 100,
                    "venue": venue,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"]["name"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub fn booking_body(name: &str, tickets: i64) -> Value {
    json!({
        "attendee_name": name,
        "email": "a@b.com",
        "phone": "1234567890",
        "number_of_tickets": tickets,
    })
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    )
}
