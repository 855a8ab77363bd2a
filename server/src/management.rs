//! Management console operations on events and venues, plus the dashboard
//! counters.

use serde::Serialize;
use validator::Validate;

use crate::backend::{Collection, ListQuery, Listing, SharedBackend, SortOrder};
use crate::fetch::{fetch_with_retry, FetchError, RetryPolicy};
use crate::models::{Booking, BookingStatus, Event, EventInput, EventStatus, Venue, VenueInput};
use crate::utils::error::AppError;
use crate::validation::FieldErrors;

pub const MANAGEMENT_VENUE_LIMIT: usize = 200;
pub const ANALYTICS_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total_events: usize,
    pub approved_events: usize,
    pub total_bookings: usize,
    pub confirmed_bookings: usize,
    pub total_tickets: i64,
    pub total_venues: usize,
    /// Whole percent, 0 when there is nothing to divide by.
    pub approval_rate: u32,
    pub confirmation_rate: u32,
}

impl Analytics {
    pub fn compute(events: &[Event], bookings: &[Booking], venue_count: usize) -> Self {
        let approved_events = events
            .iter()
            .filter(|e| e.status == Some(EventStatus::Approved))
            .count();
        let confirmed_bookings = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count();
        let total_tickets = bookings
            .iter()
            .map(|b| b.number_of_tickets.unwrap_or(0))
            .sum();

        Self {
            total_events: events.len(),
            approved_events,
            total_bookings: bookings.len(),
            confirmed_bookings,
            total_tickets,
            total_venues: venue_count,
            approval_rate: percent(approved_events, events.len()),
            confirmation_rate: percent(confirmed_bookings, bookings.len()),
        }
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

fn invalid(errors: validator::ValidationErrors) -> AppError {
    AppError::ValidationError(FieldErrors::from(errors))
}

pub struct Management {
    events: Collection<Event>,
    venues: Collection<Venue>,
    bookings: Collection<Booking>,
    policy: RetryPolicy,
}

impl Management {
    pub fn new(backend: SharedBackend, policy: RetryPolicy) -> Self {
        Self {
            events: Collection::new(backend.clone()),
            venues: Collection::new(backend.clone()),
            bookings: Collection::new(backend),
            policy,
        }
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, AppError> {
        fetch_with_retry(&self.policy, "event", || self.events.get(id))
            .await
            .map_err(AppError::from_fetch)
    }

    pub async fn create_event(&self, mut input: EventInput) -> Result<Event, AppError> {
        input.validate_new().map_err(invalid)?;
        if input.status.is_none() {
            input.status = Some(EventStatus::Draft);
        }

        let event = self.events.create(&input).await?;
        tracing::info!(event = %event.id, name = event.title(), "Event created");
        Ok(event)
    }

    pub async fn update_event(&self, id: &str, input: EventInput) -> Result<Event, AppError> {
        input.validate().map_err(invalid)?;

        let event = self.events.update(id, &input).await?;
        tracing::info!(event = %event.id, "Event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        self.events.delete(id).await?;
        tracing::info!(event = id, "Event deleted");
        Ok(())
    }

    pub async fn list_venues(&self) -> Result<Listing<Venue>, FetchError> {
        let query = ListQuery::for_document::<Venue>(MANAGEMENT_VENUE_LIMIT)
            .order_by("venue_name", SortOrder::Asc);
        fetch_with_retry(&self.policy, "venues", || self.venues.list(&query)).await
    }

    pub async fn get_venue(&self, id: &str) -> Result<Venue, AppError> {
        fetch_with_retry(&self.policy, "venue", || self.venues.get(id))
            .await
            .map_err(AppError::from_fetch)
    }

    pub async fn create_venue(&self, input: VenueInput) -> Result<Venue, AppError> {
        input.validate_new().map_err(invalid)?;

        let venue = self.venues.create(&input).await?;
        tracing::info!(venue = %venue.id, name = venue.display_name(), "Venue created");
        Ok(venue)
    }

    pub async fn update_venue(&self, id: &str, input: VenueInput) -> Result<Venue, AppError> {
        input.validate().map_err(invalid)?;

        let venue = self.venues.update(id, &input).await?;
        tracing::info!(venue = %venue.id, "Venue updated");
        Ok(venue)
    }

    /// Events pointing at the venue are left as they are; their venue renders
    /// as the bare id afterwards.
    pub async fn delete_venue(&self, id: &str) -> Result<(), AppError> {
        self.venues.delete(id).await?;
        tracing::info!(venue = id, "Venue deleted");
        Ok(())
    }

    pub async fn analytics(&self) -> Result<Analytics, FetchError> {
        let events_query = ListQuery::new(ANALYTICS_LIMIT).fields(&["name", "status"]);
        let bookings_query =
            ListQuery::new(ANALYTICS_LIMIT).fields(&["name", "event", "status", "number_of_tickets"]);
        let venues_query = ListQuery::new(ANALYTICS_LIMIT).fields(&["name"]);

        let (events, bookings, venues) = tokio::try_join!(
            fetch_with_retry(&self.policy, "events", || self.events.list(&events_query)),
            fetch_with_retry(&self.policy, "bookings", || self.bookings.list(&bookings_query)),
            fetch_with_retry(&self.policy, "venues", || self.venues.list(&venues_query)),
        )?;

        Ok(Analytics::compute(&events.records, &bookings.records, venues.len()))
    }
}
