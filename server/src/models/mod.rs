//! Typed records for the backend's document kinds.
//!
//! Field names follow the backend schema (`name` is the backend-assigned id),
//! so the structs deserialize straight from list and get responses.

use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod booking;
pub mod event;
pub mod preferences;
pub mod venue;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use event::{Event, EventInput, EventStatus};
pub use preferences::{Interface, Preferences, PreferencesPatch, Theme};
pub use venue::{Venue, VenueInput};

/// A document kind managed by the backend's generic CRUD API.
pub trait Document: DeserializeOwned + Serialize + Send + Sync {
    /// Backend doctype name, e.g. `"Custom Event"`.
    const DOCTYPE: &'static str;
    /// Fields requested by list queries.
    const LIST_FIELDS: &'static [&'static str];

    fn id(&self) -> &str;
}
