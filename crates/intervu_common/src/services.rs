//! Service abstractions for external collaborators.
//!
//! The scheduling core never talks to Google Calendar or a mail relay directly.
//! It receives trait objects implementing [`CalendarStore`] and
//! [`NotificationService`], which keeps the core testable with in-memory doubles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// Errors reported by a calendar store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarStoreError {
    /// The store cannot be reached or is not authenticated.
    #[error("Calendar service unavailable: {0}")]
    Unavailable(String),
    /// The write was rejected because the time is no longer free (HTTP 409).
    #[error("Booking conflict")]
    Conflict,
    /// Any other transport or API failure.
    #[error("Calendar API error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    /// Unexpected failure inside the store implementation.
    #[error("Internal calendar store error: {0}")]
    Internal(String),
}

/// A calendar holding the busy periods and receiving new bookings.
///
/// The trait is object safe so the scheduler can hold an `Arc<dyn CalendarStore>`.
pub trait CalendarStore: Send + Sync {
    /// List events overlapping `[time_min, time_max)`, expanded to single instances.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<RawEvent>, CalendarStoreError>;

    /// Create an event and return the identifier assigned by the store.
    fn create_event(
        &self,
        calendar_id: &str,
        event: EventSpec,
    ) -> BoxFuture<'_, CreatedEvent, CalendarStoreError>;

    /// The IANA timezone the calendar reports, if any.
    fn calendar_time_zone(&self, calendar_id: &str)
        -> BoxFuture<'_, Option<String>, CalendarStoreError>;
}

/// A trait for notification delivery.
pub trait NotificationService: Send + Sync {
    /// Send a plain-text email notification.
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, BoxedError>;
}

/// One side (start or end) of a calendar event as the store reports it.
///
/// Timed events carry `dateTime`, all-day events carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn date(value: impl Into<String>) -> Self {
        Self {
            date: Some(value.into()),
            ..Default::default()
        }
    }
}

/// A calendar event as listed by a [`CalendarStore`], not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
}

/// A reminder override attached to a created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// "email" or "popup".
    pub method: String,
    pub minutes: i32,
}

/// The event the booking validator asks the calendar store to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpec {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<String>,
    pub reminders: Vec<Reminder>,
}

/// Result of a successful create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: String,
    pub status: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification, when the transport assigns one.
    pub id: Option<String>,
    /// The status of the notification ("sent", "skipped", ...).
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_event_deserializes_google_shape() {
        let json = r#"{
            "id": "abc",
            "summary": "Standup",
            "start": {"dateTime": "2025-04-09T10:00:00Z", "timeZone": "UTC"},
            "end": {"dateTime": "2025-04-09T11:00:00Z"}
        }"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start.date_time.as_deref(), Some("2025-04-09T10:00:00Z"));
        assert_eq!(event.end.date, None);
    }

    #[test]
    fn raw_event_deserializes_all_day_shape() {
        let json = r#"{"start": {"date": "2025-04-09"}, "end": {"date": "2025-04-10"}}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.start, EventTime::date("2025-04-09"));
        assert!(event.id.is_none());
    }
}
