// --- File: crates/intervu_gcal/src/booking.rs ---
//! Booking validation and result interpretation.
//!
//! Validation is total: every malformed request becomes a [`BookingOutcome::Failure`]
//! before the calendar store is touched.

use crate::availability::{deserialize_utc, format_utc, parse_utc, serialize_utc};
use chrono::{DateTime, Utc};
use intervu_common::services::{CalendarStore, CalendarStoreError, EventSpec, Reminder};
use intervu_common::HttpStatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

pub const EVENT_DESCRIPTION: &str = "Interview scheduled via automated bot.";
pub const EMAIL_REMINDER_MINUTES: i32 = 24 * 60;
pub const POPUP_REMINDER_MINUTES: i32 = 30;

/// A booking as the conversational layer hands it over: raw, unvalidated strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub start: String,
    pub end: String,
    pub candidate_email: String,
    pub calendar_id: String,
}

/// Why a booking attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub enum ErrorKind {
    InvalidFormat,
    InvalidEmail,
    InvalidRange,
    SlotConflict,
    CalendarApiError,
    ServiceUnavailable,
    InternalError,
}

impl HttpStatusCode for ErrorKind {
    fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidFormat | ErrorKind::InvalidEmail | ErrorKind::InvalidRange => 400,
            ErrorKind::SlotConflict => 409,
            ErrorKind::CalendarApiError => 502,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::InternalError => 500,
        }
    }
}

/// A failed validation or creation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFailure {
    pub reason: ErrorKind,
    pub detail: String,
}

impl BookingFailure {
    pub fn new(reason: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl From<CalendarStoreError> for BookingFailure {
    fn from(err: CalendarStoreError) -> Self {
        match err {
            CalendarStoreError::Conflict => {
                BookingFailure::new(ErrorKind::SlotConflict, "time slot may already be booked")
            }
            CalendarStoreError::Api { status, message } => {
                let detail = match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                };
                BookingFailure::new(ErrorKind::CalendarApiError, detail)
            }
            CalendarStoreError::Unavailable(detail) => {
                BookingFailure::new(ErrorKind::ServiceUnavailable, detail)
            }
            CalendarStoreError::Internal(detail) => {
                BookingFailure::new(ErrorKind::InternalError, detail)
            }
        }
    }
}

/// Structured result of a booking attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingOutcome {
    Success {
        event_id: String,
        #[serde(serialize_with = "serialize_utc", deserialize_with = "deserialize_utc")]
        start: DateTime<Utc>,
        #[serde(serialize_with = "serialize_utc", deserialize_with = "deserialize_utc")]
        end: DateTime<Utc>,
        candidate_email: String,
    },
    Failure {
        reason: ErrorKind,
        detail: String,
    },
}

impl From<BookingFailure> for BookingOutcome {
    fn from(failure: BookingFailure) -> Self {
        BookingOutcome::Failure {
            reason: failure.reason,
            detail: failure.detail,
        }
    }
}

impl BookingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BookingOutcome::Success { .. })
    }

    pub fn event_id(&self) -> Option<&str> {
        match self {
            BookingOutcome::Success { event_id, .. } => Some(event_id),
            BookingOutcome::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<ErrorKind> {
        match self {
            BookingOutcome::Success { .. } => None,
            BookingOutcome::Failure { reason, .. } => Some(*reason),
        }
    }

    /// The human-readable line handed to the conversational agent.
    ///
    /// Successes start with "Success!", failures with "Failed".
    pub fn message(&self) -> String {
        match self {
            BookingOutcome::Success {
                start,
                end,
                candidate_email,
                ..
            } => format!(
                "Success! Interview booked for {} starting {} and ending {}.",
                candidate_email,
                format_utc(start),
                format_utc(end)
            ),
            BookingOutcome::Failure { reason, detail } => match reason {
                ErrorKind::InvalidFormat | ErrorKind::InvalidEmail | ErrorKind::InvalidRange => {
                    format!("Failed to book interview: {detail}")
                }
                ErrorKind::SlotConflict => format!(
                    "Failed to book interview: This {detail} or clash with another event. \
                     Please try choosing another slot."
                ),
                ErrorKind::CalendarApiError => {
                    format!("Failed to book interview due to a calendar API error: {detail}")
                }
                ErrorKind::ServiceUnavailable => {
                    "Failed to book interview: Google Calendar service not available.".to_string()
                }
                ErrorKind::InternalError => {
                    "Failed to book interview due to an unexpected error. Please try again later."
                        .to_string()
                }
            },
        }
    }
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Validates `request` and builds the event to create.
///
/// Checks run in order: timestamp format (start, then end), candidate email,
/// then `start < end`.
pub fn validate_booking(
    request: &BookingRequest,
    recruiter_email: &str,
) -> Result<EventSpec, BookingFailure> {
    let start = parse_utc(&request.start).ok_or_else(|| {
        BookingFailure::new(
            ErrorKind::InvalidFormat,
            format!(
                "Invalid start_time ('{}') format. Use ISO format (YYYY-MM-DDTHH:MM:SSZ).",
                request.start
            ),
        )
    })?;
    let end = parse_utc(&request.end).ok_or_else(|| {
        BookingFailure::new(
            ErrorKind::InvalidFormat,
            format!(
                "Invalid end_time ('{}') format. Use ISO format (YYYY-MM-DDTHH:MM:SSZ).",
                request.end
            ),
        )
    })?;

    let email = request.candidate_email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(BookingFailure::new(
            ErrorKind::InvalidEmail,
            format!("Invalid candidate_email ('{}').", request.candidate_email),
        ));
    }

    if start >= end {
        return Err(BookingFailure::new(
            ErrorKind::InvalidRange,
            format!(
                "start_time ('{}') must be before end_time ('{}').",
                request.start, request.end
            ),
        ));
    }

    Ok(EventSpec {
        summary: format!("Interview with {email}"),
        description: Some(EVENT_DESCRIPTION.to_string()),
        start,
        end,
        attendees: vec![email.to_string(), recruiter_email.to_string()],
        reminders: vec![
            Reminder {
                method: "email".to_string(),
                minutes: EMAIL_REMINDER_MINUTES,
            },
            Reminder {
                method: "popup".to_string(),
                minutes: POPUP_REMINDER_MINUTES,
            },
        ],
    })
}

/// Validates `request` and, if it is well formed, creates the event in `store`.
///
/// `timeout` bounds the create call; exceeding it yields
/// `Failure(CalendarApiError, "timeout")`. Notifications are not sent here.
pub async fn validate_and_book(
    request: &BookingRequest,
    store: &dyn CalendarStore,
    recruiter_email: &str,
    timeout: Option<Duration>,
) -> BookingOutcome {
    let spec = match validate_booking(request, recruiter_email) {
        Ok(spec) => spec,
        Err(failure) => {
            info!("Rejected booking request: {}", failure.detail);
            return failure.into();
        }
    };
    let (start, end) = (spec.start, spec.end);
    let candidate_email = request.candidate_email.trim().to_string();

    info!(
        "Attempting to book interview for {} from {} to {}",
        candidate_email,
        format_utc(&start),
        format_utc(&end)
    );
    let create = store.create_event(&request.calendar_id, spec);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, create).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Calendar create call exceeded {:?}", limit);
                return BookingFailure::new(ErrorKind::CalendarApiError, "timeout").into();
            }
        },
        None => create.await,
    };

    match result {
        Ok(created) => {
            info!("Interview booked successfully! Event ID: {}", created.event_id);
            BookingOutcome::Success {
                event_id: created.event_id,
                start,
                end,
                candidate_email,
            }
        }
        Err(err) => {
            let failure = BookingFailure::from(err);
            match failure.reason {
                ErrorKind::InternalError => {
                    error!("Unexpected error booking the interview: {}", failure.detail)
                }
                _ => warn!("An error occurred booking the interview: {}", failure.detail),
            }
            failure.into()
        }
    }
}
