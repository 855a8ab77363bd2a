use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use super::Document;
use crate::validation::{check_required, field_error, finish, validate_venue_phone, EMAIL_MESSAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(rename = "name")]
    pub id: String,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Venue {
    /// Display name, falling back to the id when the venue is unnamed.
    pub fn display_name(&self) -> &str {
        self.venue_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id)
    }
}

impl Document for Venue {
    const DOCTYPE: &'static str = "Venue";
    const LIST_FIELDS: &'static [&'static str] =
        &["name", "venue_name", "address", "capacity", "email", "phone"];

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VenueInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Capacity must be greater than 0"))]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_contact_email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_venue_phone"))]
    pub phone: Option<String>,
}

/// An empty contact email counts as not given.
fn validate_contact_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    Err(field_error("email", EMAIL_MESSAGE))
}

impl VenueInput {
    pub fn validate_new(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        check_required(&mut errors, "venue_name", self.venue_name.as_deref());
        finish(errors)
    }
}
