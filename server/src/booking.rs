//! Booking workflow: validated submission and status transitions.

use chrono::NaiveDate;
use serde::Serialize;
use validator::Validate;

use crate::backend::{BackendError, Collection, ListQuery, Listing, SharedBackend, SortOrder};
use crate::fetch::{fetch_with_retry, FetchError, RetryPolicy};
use crate::models::{Booking, BookingStatus, Event, NewBooking};
use crate::utils::error::AppError;
use crate::validation::FieldErrors;

pub const MANAGEMENT_BOOKING_LIMIT: usize = 200;

/// Body of the single create call issued per submission.
#[derive(Debug, Serialize)]
struct BookingRecord<'a> {
    event: &'a str,
    attendee_name: &'a str,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    number_of_tickets: i64,
    booking_date: NaiveDate,
    status: BookingStatus,
}

impl<'a> BookingRecord<'a> {
    fn new(event: &'a str, request: &'a NewBooking, date: NaiveDate, status: BookingStatus) -> Self {
        Self {
            event,
            attendee_name: request.attendee_name.trim(),
            email: request.email.trim(),
            phone: request.phone.as_deref().map(str::trim),
            number_of_tickets: request.number_of_tickets,
            booking_date: date,
            status,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: BookingStatus,
}

pub struct BookingWorkflow {
    bookings: Collection<Booking>,
    events: Collection<Event>,
    policy: RetryPolicy,
}

impl BookingWorkflow {
    pub fn new(backend: SharedBackend, policy: RetryPolicy) -> Self {
        Self {
            bookings: Collection::new(backend.clone()),
            events: Collection::new(backend),
            policy,
        }
    }

    /// Public self-service booking. Confirmed on creation, no approval step.
    ///
    /// Validation failures return before any backend call. The create call is
    /// not retried: without an idempotency key a retry could book twice.
    pub async fn submit_public(
        &self,
        event_id: &str,
        request: &NewBooking,
        today: NaiveDate,
    ) -> Result<Booking, AppError> {
        request
            .validate_public()
            .map_err(|errors| AppError::ValidationError(FieldErrors::from(errors)))?;

        let record = BookingRecord::new(event_id, request, today, BookingStatus::Confirmed);
        let booking = self.bookings.create(&record).await.map_err(|e| {
            tracing::error!(event = event_id, error = %e, "Public booking failed");
            match e {
                BackendError::Rejected(message) => AppError::Rejected(message),
                _ => AppError::ExternalServiceError(
                    "Booking failed. Please try again.".to_string(),
                ),
            }
        })?;

        tracing::info!(
            booking = %booking.id,
            event = event_id,
            tickets = request.number_of_tickets,
            "Public booking confirmed"
        );
        Ok(booking)
    }

    /// Management-side booking, created `Pending` and confirmed later.
    pub async fn create_pending(
        &self,
        event_id: &str,
        request: &NewBooking,
        today: NaiveDate,
    ) -> Result<Booking, AppError> {
        request
            .validate()
            .map_err(|errors| AppError::ValidationError(FieldErrors::from(errors)))?;

        // Existence check so a typo surfaces as 404, not as a hook rejection.
        fetch_with_retry(&self.policy, "event", || self.events.get(event_id))
            .await
            .map_err(AppError::from_fetch)?;

        let record = BookingRecord::new(event_id, request, today, BookingStatus::Pending);
        let booking = self.bookings.create(&record).await?;

        tracing::info!(booking = %booking.id, event = event_id, "Pending booking created");
        Ok(booking)
    }

    /// Moves a booking along one of the allowed edges (Pending to Confirmed or
    /// Cancelled). Anything else is refused without writing.
    pub async fn transition(&self, booking_id: &str, target: BookingStatus) -> Result<Booking, AppError> {
        let current = fetch_with_retry(&self.policy, "booking", || self.bookings.get(booking_id))
            .await
            .map_err(AppError::from_fetch)?;

        if !current.status.can_transition_to(target) {
            tracing::warn!(
                booking = booking_id,
                from = %current.status,
                to = %target,
                terminal = current.status.is_terminal(),
                "Refused booking status transition"
            );
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let updated = self
            .bookings
            .update(booking_id, &StatusUpdate { status: target })
            .await?;

        tracing::info!(booking = booking_id, from = %current.status, to = %updated.status, "Booking status updated");
        Ok(updated)
    }

    pub async fn list(&self, status: Option<BookingStatus>) -> Result<Listing<Booking>, FetchError> {
        let mut query = ListQuery::for_document::<Booking>(MANAGEMENT_BOOKING_LIMIT)
            .order_by("booking_date", SortOrder::Desc);
        if let Some(status) = status {
            query = query.filter("status", status.as_str());
        }
        fetch_with_retry(&self.policy, "bookings", || self.bookings.list(&query)).await
    }

    pub async fn delete(&self, booking_id: &str) -> Result<(), AppError> {
        self.bookings.delete(booking_id).await?;
        tracing::info!(booking = booking_id, "Booking deleted");
        Ok(())
    }
}
