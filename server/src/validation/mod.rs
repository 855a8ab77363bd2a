//! Field rules shared by the gateway's form checks and the in-memory
//! backend's save hook.
//!
//! The backend hook is authoritative; the gateway runs the same rules before
//! any network call so a bad submission never leaves the process.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

pub const CAPACITY_MESSAGE: &str = "Capacity must be greater than 0";
pub const DATE_ORDER_MESSAGE: &str = "End Date must be after Start Date";
pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const VENUE_REQUIRED_MESSAGE: &str = "Please select a Venue";
pub const EVENT_STATUS_MESSAGE: &str = "Status must be Draft, Approved, or Rejected";
pub const NAME_MESSAGE: &str = "Name must be at least 2 characters";
pub const EMAIL_MESSAGE: &str = "Invalid email address";
pub const PHONE_MESSAGE: &str = "Phone number must be at least 10 digits";
pub const VENUE_PHONE_MESSAGE: &str = "Please enter a valid phone number";
pub const MIN_TICKETS_MESSAGE: &str = "At least 1 ticket required";
pub const MAX_TICKETS_MESSAGE: &str = "Maximum 10 tickets allowed";

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MIN_TICKETS: i64 = 1;
pub const MAX_TICKETS: i64 = 10;

/// Key the derive uses for struct-level (`schema`) errors.
const STRUCT_LEVEL: &str = "__all__";

pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn finish(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Cross-field error reported against `field` instead of the struct.
pub fn struct_error(field: &'static str, code: &'static str, message: &'static str) -> ValidationError {
    let mut err = field_error(code, message);
    err.add_param(Cow::Borrowed("field"), &field);
    err
}

/// End date may equal the start date but never precede it.
pub fn date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(struct_error("end_date", "date_order", DATE_ORDER_MESSAGE))
        }
        _ => Ok(()),
    }
}

pub fn check_required(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.add(field, field_error("required", REQUIRED_MESSAGE));
    }
}

pub fn validate_max_tickets(tickets: i64) -> Result<(), ValidationError> {
    if tickets > MAX_TICKETS {
        return Err(field_error("range", MAX_TICKETS_MESSAGE));
    }
    Ok(())
}

/// Counts digits only, so `+1 (555) 010-2030` passes.
pub fn validate_phone_digits(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(field_error("phone", PHONE_MESSAGE));
    }
    Ok(())
}

/// Venue contact numbers are only length-checked; empty means not given.
pub fn validate_venue_phone(phone: &str) -> Result<(), ValidationError> {
    let len = phone.chars().count();
    if len == 0 || (7..=15).contains(&len) {
        return Ok(());
    }
    Err(field_error("phone", VENUE_PHONE_MESSAGE))
}

/// Field name to first message, as rendered next to the offending input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(field.into(), message.into());
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// First message in field order, used as the headline of the error.
    pub fn summary(&self) -> String {
        self.0
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| "The provided input is invalid".to_string())
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let map = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, list)| {
                let first = list.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                let field = match first.params.get("field").and_then(|v| v.as_str()) {
                    Some(target) if field == STRUCT_LEVEL => target.to_string(),
                    _ => field.to_string(),
                };
                Some((field, message))
            })
            .collect();
        Self(map)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        Self::from(&errors)
    }
}
