use std::sync::Arc;

use crate::backend::SharedBackend;
use crate::booking::BookingWorkflow;
use crate::catalog::CatalogReader;
use crate::config::Config;
use crate::management::Management;
use crate::preferences::PreferenceStore;

/// Shared application state handed to every handler via `State<AppState>`.
///
/// Cheap to clone; everything behind it is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogReader>,
    pub bookings: Arc<BookingWorkflow>,
    pub management: Arc<Management>,
    pub preferences: Arc<PreferenceStore>,
}

impl AppState {
    pub fn new(config: Config, backend: SharedBackend, preferences: PreferenceStore) -> Self {
        let retry = config.retry;

        Self {
            catalog: Arc::new(CatalogReader::new(backend.clone(), retry)),
            bookings: Arc::new(BookingWorkflow::new(backend.clone(), retry)),
            management: Arc::new(Management::new(backend, retry)),
            preferences: Arc::new(preferences),
            config: Arc::new(config),
        }
    }
}
