use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::Document;
use crate::validation::{check_required, date_order, field_error, finish, VENUE_REQUIRED_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Draft,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "name")]
    pub id: String,
    #[serde(default, alias = "custom_event_name")]
    pub event_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

impl Event {
    pub fn title(&self) -> &str {
        self.event_name.as_deref().unwrap_or("Untitled Event")
    }
}

impl Document for Event {
    const DOCTYPE: &'static str = "Custom Event";
    const LIST_FIELDS: &'static [&'static str] = &[
        "name",
        "event_name",
        "description",
        "start_date",
        "end_date",
        "capacity",
        "venue",
        "status",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update payload for an event. Absent fields are left untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_event_dates", skip_on_field_errors = false))]
pub struct EventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Capacity must be greater than 0"))]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

fn validate_event_dates(input: &EventInput) -> Result<(), ValidationError> {
    date_order(input.start_date, input.end_date)
}

impl EventInput {
    /// Create additionally requires a name and a venue; updates may be partial.
    pub fn validate_new(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        check_required(&mut errors, "event_name", self.event_name.as_deref());
        if self.venue.as_deref().map_or(true, |v| v.trim().is_empty()) {
            errors.add("venue", field_error("required", VENUE_REQUIRED_MESSAGE));
        }
        finish(errors)
    }
}
