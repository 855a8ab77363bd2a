use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::Document;
use crate::validation::{
    check_required, finish, validate_max_tickets, validate_phone_digits, MIN_TICKETS,
};

/// Booking lifecycle. `Pending` is the only state with outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        matches!(
            (self, target),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "name")]
    pub id: String,
    pub event: String,
    #[serde(default)]
    pub attendee_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub number_of_tickets: Option<i64>,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    pub status: BookingStatus,
}

impl Document for Booking {
    const DOCTYPE: &'static str = "Event Booking";
    const LIST_FIELDS: &'static [&'static str] = &[
        "name",
        "event",
        "attendee_name",
        "email",
        "phone",
        "number_of_tickets",
        "booking_date",
        "status",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Attendee details as submitted from a booking form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewBooking {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub attendee_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(
        range(min = MIN_TICKETS, message = "At least 1 ticket required"),
        custom(function = "validate_max_tickets")
    )]
    pub number_of_tickets: i64,
}

impl NewBooking {
    /// The public form additionally insists on a reachable phone number.
    pub fn validate_public(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        match self.phone.as_deref() {
            Some(phone) => {
                if let Err(err) = validate_phone_digits(phone) {
                    errors.add("phone", err);
                }
            }
            None => check_required(&mut errors, "phone", None),
        }
        finish(errors)
    }
}
