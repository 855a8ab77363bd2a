//! The document backend collaborator.
//!
//! `Backend` is the raw, doctype-keyed CRUD surface (JSON in, JSON out).
//! `Collection` layers typed decoding on top and quarantines rows that do not
//! match the expected record shape.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod frappe;
pub mod memory;

pub use frappe::FrappeClient;
pub use memory::InMemoryBackend;

use crate::models::Document;

pub type Fields = Map<String, Value>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("{doctype} {id} not found")]
    NotFound { doctype: String, id: String },

    /// The backend's save hook refused the write.
    #[error("{0}")]
    Rejected(String),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BackendError {
    /// Transient failures worth one more attempt on a read.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Transport(_) | BackendError::Timeout => true,
            BackendError::Status { status, .. } => *status >= 500,
            BackendError::NotFound { .. }
            | BackendError::Rejected(_)
            | BackendError::Decode(_)
            | BackendError::InvalidUrl(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub fields: Vec<String>,
    pub limit: usize,
    pub order_by: Option<OrderBy>,
    /// Equality filters, all of which must match.
    pub filters: Vec<(String, Value)>,
}

impl ListQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            fields: Vec::new(),
            limit,
            order_by: None,
            filters: Vec::new(),
        }
    }

    pub fn for_document<T: Document>(limit: usize) -> Self {
        Self::new(limit).fields(T::LIST_FIELDS)
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            order,
        });
        self
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>, BackendError>;

    async fn get(&self, doctype: &str, id: &str) -> Result<Value, BackendError>;

    async fn create(&self, doctype: &str, fields: Fields) -> Result<Value, BackendError>;

    async fn update(&self, doctype: &str, id: &str, fields: Fields) -> Result<Value, BackendError>;

    async fn delete(&self, doctype: &str, id: &str) -> Result<(), BackendError>;
}

pub type SharedBackend = Arc<dyn Backend>;

/// Rows that decoded, plus how many were dropped as malformed.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub quarantined: usize,
}

impl<T> Listing<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Typed access to one document kind.
pub struct Collection<T> {
    backend: SharedBackend,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _kind: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            _kind: PhantomData,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Listing<T>, BackendError> {
        let rows = self.backend.list(T::DOCTYPE, query).await?;
        Ok(decode_rows(rows))
    }

    pub async fn get(&self, id: &str) -> Result<T, BackendError> {
        let row = self.backend.get(T::DOCTYPE, id).await?;
        decode_one(row)
    }

    pub async fn create<I: Serialize + Sync>(&self, input: &I) -> Result<T, BackendError> {
        let row = self.backend.create(T::DOCTYPE, to_fields(input)?).await?;
        let record: T = decode_one(row)?;
        tracing::debug!(doctype = T::DOCTYPE, id = record.id(), "Document created");
        Ok(record)
    }

    pub async fn update<I: Serialize + Sync>(&self, id: &str, input: &I) -> Result<T, BackendError> {
        let row = self.backend.update(T::DOCTYPE, id, to_fields(input)?).await?;
        decode_one(row)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.backend.delete(T::DOCTYPE, id).await
    }
}

pub fn to_fields<I: Serialize>(input: &I) -> Result<Fields, BackendError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BackendError::Decode(format!(
            "expected an object payload, got {other}"
        ))),
        Err(e) => Err(BackendError::Decode(e.to_string())),
    }
}

fn decode_one<T: Document>(row: Value) -> Result<T, BackendError> {
    serde_json::from_value(row)
        .map_err(|e| BackendError::Decode(format!("malformed {} record: {e}", T::DOCTYPE)))
}

fn decode_rows<T: Document>(rows: Vec<Value>) -> Listing<T> {
    let mut records = Vec::with_capacity(rows.len());
    let mut quarantined = 0;

    for row in rows {
        match serde_json::from_value::<T>(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                quarantined += 1;
                tracing::warn!(doctype = T::DOCTYPE, error = %e, "Quarantined malformed record");
            }
        }
    }

    Listing {
        records,
        quarantined,
    }
}
