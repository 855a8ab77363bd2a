use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventhub_server::backend::{FrappeClient, InMemoryBackend, SharedBackend};
use eventhub_server::config::Config;
use eventhub_server::preferences::PreferenceStore;
use eventhub_server::routes::create_routes;
use eventhub_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eventhub_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    let backend: SharedBackend = match config.backend_url.as_deref() {
        Some(url) => {
            let client = FrappeClient::new(url, config.backend_token.as_deref())
                .expect("Failed to build Frappe client");
            tracing::info!(backend = client.base_url(), "Using Frappe backend");
            Arc::new(client)
        }
        None => {
            tracing::warn!("FRAPPE_BASE_URL not set, using in-memory backend");
            Arc::new(InMemoryBackend::new())
        }
    };

    let preferences = PreferenceStore::load(config.preferences_path.clone()).await;
    tracing::info!(
        path = %preferences.path().display(),
        interface = ?preferences.current_interface().await,
        "Preferences loaded"
    );

    let addr = config.socket_addr();
    let state = AppState::new(config, backend, preferences);
    let app = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
