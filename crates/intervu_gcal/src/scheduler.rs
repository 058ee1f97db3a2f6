// --- File: crates/intervu_gcal/src/scheduler.rs ---
//! The two operations offered to the conversational agent.
//!
//! [`InterviewScheduler`] owns explicit handles to the calendar store and the
//! notifier. A scheduler built without a calendar store answers every call with
//! a service-unavailable result instead of failing at startup.

use crate::availability::{free_slots_for_events, FreeSlot, Horizon, WorkingHours};
use crate::booking::{validate_and_book, BookingOutcome, BookingRequest, ErrorKind};
use crate::notifications::{candidate_notice, recruiter_notice, Notice};
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use intervu_common::services::{CalendarStore, NotificationService};
use intervu_common::{config_error, external_service_error, log_error, IntervuError};
use intervu_config::SchedulingConfig;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CALENDAR_UNAVAILABLE: &str =
    "Google Calendar service not available. Cannot fetch slots.";

/// Why free slots could not be computed. An empty slot list is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("Could not fetch calendar events: {0}")]
    FetchFailed(String),
    #[error("days_ahead must be at most {max}, got {requested}")]
    HorizonTooLong { requested: u32, max: u32 },
}

impl From<AvailabilityError> for IntervuError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::ServiceUnavailable(message) => {
                IntervuError::ServiceUnavailable(message)
            }
            fetch @ AvailabilityError::FetchFailed(_) => {
                external_service_error("google-calendar", fetch)
            }
            invalid @ AvailabilityError::HorizonTooLong { .. } => {
                IntervuError::ValidationError(invalid.to_string())
            }
        }
    }
}

/// Parsed, validated scheduling configuration.
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub recruiter_email: String,
    pub default_calendar_id: String,
    pub horizon_days: u32,
    pub max_horizon_days: u32,
    pub working_hours: WorkingHours,
    pub time_zone: Tz,
    pub use_calendar_time_zone: bool,
    pub booking_timeout: Option<Duration>,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            recruiter_email: "recruiter@example.com".to_string(),
            default_calendar_id: "primary".to_string(),
            horizon_days: crate::availability::DEFAULT_HORIZON_DAYS,
            max_horizon_days: 60,
            working_hours: WorkingHours::default(),
            time_zone: Tz::UTC,
            use_calendar_time_zone: false,
            booking_timeout: Some(Duration::from_secs(30)),
        }
    }
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name {
        "Mon" => Some(Weekday::Mon),
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        "Sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl SchedulingSettings {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, IntervuError> {
        let start = NaiveTime::parse_from_str(&config.work_start, "%H:%M")
            .map_err(|e| config_error(format!("invalid work_start '{}': {e}", config.work_start)))?;
        let end = NaiveTime::parse_from_str(&config.work_end, "%H:%M")
            .map_err(|e| config_error(format!("invalid work_end '{}': {e}", config.work_end)))?;
        if start >= end {
            return Err(config_error("work_start must be before work_end"));
        }

        let mut working_days = Vec::with_capacity(config.working_days.len());
        for day in &config.working_days {
            let weekday =
                parse_weekday(day).ok_or_else(|| config_error(format!("unknown weekday '{day}'")))?;
            working_days.push(weekday);
        }

        if config.horizon_days > config.max_horizon_days {
            return Err(config_error(format!(
                "horizon_days ({}) exceeds max_horizon_days ({})",
                config.horizon_days, config.max_horizon_days
            )));
        }

        let time_zone = Tz::from_str(&config.time_zone)
            .map_err(|e| config_error(format!("invalid time_zone '{}': {e}", config.time_zone)))?;

        Ok(Self {
            recruiter_email: config.recruiter_email.clone(),
            default_calendar_id: config.default_calendar_id.clone(),
            horizon_days: config.horizon_days,
            max_horizon_days: config.max_horizon_days,
            working_hours: WorkingHours {
                start,
                end,
                working_days,
            },
            time_zone,
            use_calendar_time_zone: config.use_calendar_time_zone,
            booking_timeout: (config.booking_timeout_secs > 0)
                .then(|| Duration::from_secs(config.booking_timeout_secs)),
        })
    }
}

pub struct InterviewScheduler {
    calendar: Option<Arc<dyn CalendarStore>>,
    notifier: Arc<dyn NotificationService>,
    settings: SchedulingSettings,
}

impl InterviewScheduler {
    pub fn new(
        calendar: Option<Arc<dyn CalendarStore>>,
        notifier: Arc<dyn NotificationService>,
        settings: SchedulingSettings,
    ) -> Self {
        Self {
            calendar,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    pub fn is_calendar_connected(&self) -> bool {
        self.calendar.is_some()
    }

    fn calendar_id_or_default<'a>(&'a self, calendar_id: Option<&'a str>) -> &'a str {
        match calendar_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => &self.settings.default_calendar_id,
        }
    }

    /// Free working-hours windows for the next `days_ahead` days (default from settings).
    pub async fn get_free_slots(
        &self,
        calendar_id: Option<&str>,
        days_ahead: Option<u32>,
    ) -> Result<Vec<FreeSlot>, AvailabilityError> {
        self.get_free_slots_at(calendar_id, days_ahead, Utc::now()).await
    }

    /// Same as [`get_free_slots`](Self::get_free_slots) with an explicit clock.
    pub async fn get_free_slots_at(
        &self,
        calendar_id: Option<&str>,
        days_ahead: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Vec<FreeSlot>, AvailabilityError> {
        let days = days_ahead.unwrap_or(self.settings.horizon_days);
        if days > self.settings.max_horizon_days {
            return Err(AvailabilityError::HorizonTooLong {
                requested: days,
                max: self.settings.max_horizon_days,
            });
        }
        let Some(store) = self.calendar.as_deref() else {
            warn!("Google Calendar service not available.");
            return Err(AvailabilityError::ServiceUnavailable(
                CALENDAR_UNAVAILABLE.to_string(),
            ));
        };
        let calendar_id = self.calendar_id_or_default(calendar_id);
        let time_zone = self.resolve_time_zone(store, calendar_id).await;
        let horizon = Horizon::new(now, days, time_zone);

        info!(
            "Checking calendar '{}' for free slots between {} and {}",
            calendar_id, horizon.time_min, horizon.time_max
        );
        let events = store
            .list_events(calendar_id, horizon.time_min, horizon.time_max)
            .await
            .map_err(|e| {
                log_error(&e, "An error occurred fetching calendar events");
                AvailabilityError::FetchFailed(e.to_string())
            })?;
        debug!("Fetched {} calendar events", events.len());

        let slots = free_slots_for_events(
            &events,
            days,
            now,
            &self.settings.working_hours,
            time_zone,
        );
        if slots.is_empty() {
            info!("No free slots found in the next {} days", days);
        } else {
            info!("Found {} free slots.", slots.len());
        }
        Ok(slots)
    }

    async fn resolve_time_zone(&self, store: &dyn CalendarStore, calendar_id: &str) -> Tz {
        if !self.settings.use_calendar_time_zone {
            return self.settings.time_zone;
        }
        match store.calendar_time_zone(calendar_id).await {
            Ok(Some(name)) => match Tz::from_str(&name) {
                Ok(tz) => {
                    debug!("Using calendar time zone {}", tz);
                    tz
                }
                Err(_) => {
                    warn!("Calendar reported unknown time zone '{}', using {}", name, self.settings.time_zone);
                    self.settings.time_zone
                }
            },
            Ok(None) => self.settings.time_zone,
            Err(e) => {
                warn!(
                    "Could not fetch calendar time zone: {}. Defaulting to {}.",
                    e, self.settings.time_zone
                );
                self.settings.time_zone
            }
        }
    }

    /// Validates and books `request`, then notifies candidate and recruiter.
    ///
    /// Notification failures are logged and never change the outcome.
    pub async fn book_interview(&self, mut request: BookingRequest) -> BookingOutcome {
        let Some(store) = self.calendar.as_deref() else {
            warn!("Google Calendar service not available.");
            return BookingOutcome::Failure {
                reason: ErrorKind::ServiceUnavailable,
                detail: "Google Calendar service not available.".to_string(),
            };
        };
        request.calendar_id = self
            .calendar_id_or_default(Some(&request.calendar_id))
            .to_string();

        let outcome = validate_and_book(
            &request,
            store,
            &self.settings.recruiter_email,
            self.settings.booking_timeout,
        )
        .await;

        if let BookingOutcome::Success {
            start,
            end,
            candidate_email,
            ..
        } = &outcome
        {
            let to_candidate = candidate_notice(candidate_email, start, end);
            let to_recruiter =
                recruiter_notice(&self.settings.recruiter_email, candidate_email, start, end);
            tokio::join!(self.notify(to_candidate), self.notify(to_recruiter));
        }
        outcome
    }

    async fn notify(&self, notice: Notice) {
        match self
            .notifier
            .send_email(&notice.to, &notice.subject, &notice.body)
            .await
        {
            Ok(result) => info!("Notification to {} finished: {}", notice.to, result.status),
            Err(e) => log_error(e, &format!("Error sending email to {}", notice.to)),
        }
    }
}
