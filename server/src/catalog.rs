//! Public event discovery: the event catalog joined with venue display names.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::backend::{Collection, ListQuery, Listing, SharedBackend, SortOrder};
use crate::fetch::{fetch_with_retry, FetchError, RetryPolicy};
use crate::models::{Event, Venue};

pub const PUBLIC_EVENT_LIMIT: usize = 200;
pub const PUBLIC_VENUE_LIMIT: usize = 500;

/// Shown when an event names no venue at all.
pub const VENUE_PLACEHOLDER: &str = "TBA";

/// Venue id to display name.
#[derive(Debug, Clone, Default)]
pub struct VenueDirectory {
    names: HashMap<String, String>,
}

impl VenueDirectory {
    pub fn from_venues(venues: &[Venue]) -> Self {
        let names = venues
            .iter()
            .map(|v| (v.id.clone(), v.display_name().to_string()))
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Unknown ids are echoed back rather than treated as errors; a dangling
    /// reference (e.g. a deleted venue) still renders.
    pub fn display_name(&self, venue: Option<&str>) -> String {
        match venue.filter(|id| !id.is_empty()) {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => VENUE_PLACEHOLDER.to_string(),
        }
    }
}

/// One row of the discovery page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    pub id: String,
    pub title: String,
    pub venue: Option<String>,
    pub venue_name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub capacity: Option<i64>,
}

impl EventCard {
    pub fn new(event: Event, venues: &VenueDirectory) -> Self {
        let venue_name = venues.display_name(event.venue.as_deref());
        Self {
            title: event.title().to_string(),
            id: event.id,
            venue: event.venue,
            venue_name,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            capacity: event.capacity,
        }
    }

    /// Case-insensitive match on title or venue name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.title.to_lowercase().contains(&needle)
            || self.venue_name.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub events: Vec<EventCard>,
    pub total: usize,
    pub quarantined: usize,
}

pub struct CatalogReader {
    events: Collection<Event>,
    venues: Collection<Venue>,
    policy: RetryPolicy,
}

impl CatalogReader {
    pub fn new(backend: SharedBackend, policy: RetryPolicy) -> Self {
        Self {
            events: Collection::new(backend.clone()),
            venues: Collection::new(backend),
            policy,
        }
    }

    pub async fn list_events(&self) -> Result<Listing<Event>, FetchError> {
        let query = ListQuery::for_document::<Event>(PUBLIC_EVENT_LIMIT)
            .order_by("start_date", SortOrder::Desc);
        fetch_with_retry(&self.policy, "events", || self.events.list(&query)).await
    }

    pub async fn venue_directory(&self) -> Result<(VenueDirectory, usize), FetchError> {
        let query = ListQuery::new(PUBLIC_VENUE_LIMIT).fields(&["name", "venue_name"]);
        let listing = fetch_with_retry(&self.policy, "venues", || self.venues.list(&query)).await?;
        Ok((VenueDirectory::from_venues(&listing.records), listing.quarantined))
    }

    /// Events and venues are read concurrently and joined by venue id.
    pub async fn discover(&self, search: Option<&str>) -> Result<Catalog, FetchError> {
        let (events, (venues, venues_quarantined)) =
            tokio::try_join!(self.list_events(), self.venue_directory())?;

        let total = events.len();
        let cards: Vec<EventCard> = events
            .records
            .into_iter()
            .map(|event| EventCard::new(event, &venues))
            .filter(|card| search.map_or(true, |needle| card.matches(needle)))
            .collect();

        tracing::debug!(
            total,
            shown = cards.len(),
            venues = venues.len(),
            "Catalog assembled"
        );

        Ok(Catalog {
            events: cards,
            total,
            quarantined: events.quarantined + venues_quarantined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: &str, name: &str) -> Venue {
        Venue {
            id: id.to_string(),
            venue_name: Some(name.to_string()),
            address: None,
            capacity: None,
            email: None,
            phone: None,
        }
    }

    fn event(id: &str, name: &str, venue: Option<&str>) -> Event {
        Event {
            id: id.to_string(),
            event_name: Some(name.to_string()),
            description: None,
            start_date: None,
            end_date: None,
            capacity: None,
            venue: venue.map(str::to_string),
            status: None,
        }
    }

    #[test]
    fn test_venue_placeholders() {
        let directory = VenueDirectory::from_venues(&[venue("VEN-1", "Main Hall")]);
        assert_eq!(directory.display_name(Some("VEN-1")), "Main Hall");
        assert_eq!(directory.display_name(Some("VEN-gone")), "VEN-gone");
        assert_eq!(directory.display_name(None), VENUE_PLACEHOLDER);
        assert_eq!(directory.display_name(Some("")), VENUE_PLACEHOLDER);
    }

    #[test]
    fn test_search_matches_title_or_venue() {
        let directory = VenueDirectory::from_venues(&[venue("VEN-1", "Main Hall")]);
        let card = EventCard::new(event("EV-1", "Rust Meetup", Some("VEN-1")), &directory);

        assert!(card.matches("rust"));
        assert!(card.matches("MAIN"));
        assert!(card.matches(""));
        assert!(!card.matches("jazz"));
    }

    #[test]
    fn test_untitled_event() {
        let mut ev = event("EV-2", "", None);
        ev.event_name = None;
        let card = EventCard::new(ev, &VenueDirectory::default());
        assert_eq!(card.title, "Untitled Event");
        assert_eq!(card.venue_name, VENUE_PLACEHOLDER);
    }
}
