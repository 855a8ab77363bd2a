//! In-process document store standing in for the Frappe site.
//!
//! Runs the same save hooks the real backend runs before persisting, so the
//! gateway can be exercised end to end without a Frappe deployment.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use validator::Validate;

use super::{Backend, BackendError, Fields, ListQuery, SortOrder};
use crate::models::{
    Booking, BookingStatus, Document, Event, EventInput, EventStatus, Venue, VenueInput,
};
use crate::validation::{FieldErrors, EVENT_STATUS_MESSAGE, VENUE_REQUIRED_MESSAGE};

const ID_LEN: usize = 10;

#[derive(Default)]
pub struct InMemoryBackend {
    docs: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
    failing_reads: AtomicUsize,
    failing_writes: AtomicUsize,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` reads fail with a 503, as an overloaded site would.
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, AtomicOrdering::SeqCst);
    }

    /// The next `count` writes fail with a 500 before any hook runs.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, AtomicOrdering::SeqCst);
    }

    /// Number of create, update and delete calls received.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(AtomicOrdering::SeqCst)
    }

    fn begin_read(&self) -> Result<(), BackendError> {
        self.reads.fetch_add(1, AtomicOrdering::SeqCst);
        injected_failure(&self.failing_reads, 503, "Service Unavailable")
    }

    fn begin_write(&self) -> Result<(), BackendError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        injected_failure(&self.failing_writes, 500, "Internal Server Error")
    }

    async fn run_hooks(&self, doctype: &str, doc: &Fields) -> Result<(), BackendError> {
        if doctype == Event::DOCTYPE {
            validate_event(doc)
        } else if doctype == Venue::DOCTYPE {
            validate_as::<VenueInput>(doc)
        } else if doctype == Booking::DOCTYPE {
            self.validate_booking(doc).await
        } else {
            Ok(())
        }
    }

    async fn validate_booking(&self, doc: &Fields) -> Result<(), BackendError> {
        let event = doc.get("event").and_then(Value::as_str).unwrap_or_default();
        let event_exists = self
            .docs
            .read()
            .await
            .get(Event::DOCTYPE)
            .is_some_and(|events| events.contains_key(event));
        if !event_exists {
            return Err(BackendError::Rejected(format!(
                "Could not find Event: {event}"
            )));
        }

        if let Some(tickets) = doc.get("number_of_tickets").and_then(Value::as_i64) {
            if tickets <= 0 {
                return Err(BackendError::Rejected(
                    "Number of tickets must be greater than 0".to_string(),
                ));
            }
        }

        match doc.get("status") {
            None | Some(Value::Null) => Ok(()),
            Some(status) => serde_json::from_value::<BookingStatus>(status.clone())
                .map(|_| ())
                .map_err(|_| BackendError::Rejected("Invalid status".to_string())),
        }
    }
}

fn injected_failure(remaining: &AtomicUsize, status: u16, message: &str) -> Result<(), BackendError> {
    let injected =
        remaining.fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| n.checked_sub(1));
    match injected {
        Ok(_) => Err(BackendError::Status {
            status,
            message: message.to_string(),
        }),
        Err(_) => Ok(()),
    }
}

fn validate_event(doc: &Fields) -> Result<(), BackendError> {
    match doc.get("status") {
        None | Some(Value::Null) => {}
        Some(status) if serde_json::from_value::<EventStatus>(status.clone()).is_ok() => {}
        Some(_) => return Err(BackendError::Rejected(EVENT_STATUS_MESSAGE.to_string())),
    }

    validate_as::<EventInput>(doc)?;

    let has_venue = doc
        .get("venue")
        .and_then(Value::as_str)
        .is_some_and(|venue| !venue.trim().is_empty());
    if !has_venue {
        return Err(BackendError::Rejected(VENUE_REQUIRED_MESSAGE.to_string()));
    }
    Ok(())
}

fn validate_as<T: DeserializeOwned + Validate>(doc: &Fields) -> Result<(), BackendError> {
    let input: T = serde_json::from_value(Value::Object(doc.clone()))
        .map_err(|e| BackendError::Rejected(format!("Invalid value: {e}")))?;
    input
        .validate()
        .map_err(|errors| BackendError::Rejected(FieldErrors::from(errors).summary()))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..ID_LEN].to_string()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn project(doc: &Fields, fields: &[String]) -> Value {
    if fields.is_empty() {
        return Value::Object(doc.clone());
    }
    let projected = fields
        .iter()
        .map(|field| (field.clone(), doc.get(field).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(projected)
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>, BackendError> {
        self.begin_read()?;
        let docs = self.docs.read().await;
        let Some(collection) = docs.get(doctype) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Fields> = collection
            .values()
            .filter(|doc| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| doc.get(field) == Some(value))
            })
            .collect();

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.field), b.get(&order.field));
                match order.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        Ok(rows
            .into_iter()
            .take(query.limit)
            .map(|doc| project(doc, &query.fields))
            .collect())
    }

    async fn get(&self, doctype: &str, id: &str) -> Result<Value, BackendError> {
        self.begin_read()?;
        self.docs
            .read()
            .await
            .get(doctype)
            .and_then(|collection| collection.get(id))
            .map(|doc| Value::Object(doc.clone()))
            .ok_or_else(|| BackendError::NotFound {
                doctype: doctype.to_string(),
                id: id.to_string(),
            })
    }

    async fn create(&self, doctype: &str, mut fields: Fields) -> Result<Value, BackendError> {
        self.begin_write()?;
        self.run_hooks(doctype, &fields).await?;

        let id = new_id();
        fields.insert("name".to_string(), Value::String(id.clone()));
        if doctype == Event::DOCTYPE && !fields.contains_key("status") {
            fields.insert("status".to_string(), Value::String("Draft".to_string()));
        }

        self.docs
            .write()
            .await
            .entry(doctype.to_string())
            .or_default()
            .insert(id, fields.clone());

        Ok(Value::Object(fields))
    }

    async fn update(&self, doctype: &str, id: &str, fields: Fields) -> Result<Value, BackendError> {
        self.begin_write()?;
        let not_found = || BackendError::NotFound {
            doctype: doctype.to_string(),
            id: id.to_string(),
        };

        let mut merged = self
            .docs
            .read()
            .await
            .get(doctype)
            .and_then(|collection| collection.get(id))
            .cloned()
            .ok_or_else(not_found)?;
        for (key, value) in fields {
            if key != "name" {
                merged.insert(key, value);
            }
        }

        self.run_hooks(doctype, &merged).await?;

        // Last write wins, as on the real backend.
        let mut docs = self.docs.write().await;
        let slot = docs
            .get_mut(doctype)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(not_found)?;
        *slot = merged.clone();

        Ok(Value::Object(merged))
    }

    async fn delete(&self, doctype: &str, id: &str) -> Result<(), BackendError> {
        self.begin_write()?;
        self.docs
            .write()
            .await
            .get_mut(doctype)
            .and_then(|collection| collection.remove(id))
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound {
                doctype: doctype.to_string(),
                id: id.to_string(),
            })
    }
}
