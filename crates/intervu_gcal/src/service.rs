// --- File: crates/intervu_gcal/src/service.rs ---
//! Google Calendar implementation of the [`CalendarStore`] trait, plus an
//! in-memory double for tests.

use crate::auth::HubType;
use crate::availability::format_utc;
use chrono::{DateTime, Utc};
use google_calendar3::api::{
    Event, EventAttendee, EventDateTime, EventReminder, EventReminders,
};
use intervu_common::services::{
    BoxFuture, CalendarStore, CalendarStoreError, CreatedEvent, EventSpec, EventTime, RawEvent,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Google Calendar store backed by an authenticated hub.
pub struct GoogleCalendarStore {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarStore {
    /// Create a new Google Calendar store.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

/// Maps a Google API error onto the store taxonomy; 409 means the slot is taken.
pub fn classify_api_error(err: google_calendar3::Error) -> CalendarStoreError {
    let status = match &err {
        google_calendar3::Error::BadRequest(value) => value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok()),
        google_calendar3::Error::Failure(response) => Some(response.status().as_u16()),
        _ => None,
    };
    match status {
        Some(409) => CalendarStoreError::Conflict,
        Some(401) | Some(403) => CalendarStoreError::Unavailable(err.to_string()),
        _ => CalendarStoreError::Api {
            status,
            message: err.to_string(),
        },
    }
}

fn raw_time(value: Option<&EventDateTime>) -> EventTime {
    value
        .map(|t| EventTime {
            date_time: t.date_time.as_ref().map(format_utc),
            date: t.date.map(|d| d.format("%Y-%m-%d").to_string()),
            time_zone: t.time_zone.clone(),
        })
        .unwrap_or_default()
}

fn to_raw_event(event: &Event) -> RawEvent {
    RawEvent {
        id: event.id.clone(),
        summary: event.summary.clone(),
        start: raw_time(event.start.as_ref()),
        end: raw_time(event.end.as_ref()),
    }
}

fn to_google_event(spec: EventSpec) -> Event {
    Event {
        summary: Some(spec.summary),
        description: spec.description,
        start: Some(EventDateTime {
            date_time: Some(spec.start),
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(spec.end),
            time_zone: Some("UTC".to_string()),
            ..Default::default()
        }),
        attendees: Some(
            spec.attendees
                .into_iter()
                .map(|email| EventAttendee {
                    email: Some(email),
                    ..Default::default()
                })
                .collect(),
        ),
        reminders: Some(EventReminders {
            use_default: Some(false),
            overrides: Some(
                spec.reminders
                    .into_iter()
                    .map(|r| EventReminder {
                        method: Some(r.method),
                        minutes: Some(r.minutes),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl CalendarStore for GoogleCalendarStore {
    /// Lists single event instances between `time_min` and `time_max`, following
    /// result pages until the API stops returning a page token.
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<RawEvent>, CalendarStoreError> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut raw_events = Vec::new();
            let mut page_token: Option<String> = None;
            loop {
                let mut call = calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(time_min)
                    .time_max(time_max)
                    .single_events(true)
                    .order_by("startTime");
                if let Some(token) = page_token.as_deref() {
                    call = call.page_token(token);
                }
                let (_response, events) = call.doit().await.map_err(classify_api_error)?;

                raw_events.extend(events.items.unwrap_or_default().iter().map(to_raw_event));
                match events.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }
            debug!("Calendar '{}' returned {} events", calendar_id, raw_events.len());
            Ok(raw_events)
        })
    }

    /// Inserts the event and sends calendar invites to every attendee.
    fn create_event(
        &self,
        calendar_id: &str,
        event: EventSpec,
    ) -> BoxFuture<'_, CreatedEvent, CalendarStoreError> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, created_event) = calendar_hub
                .events()
                .insert(to_google_event(event), &calendar_id)
                .send_updates("all")
                .doit()
                .await
                .map_err(classify_api_error)?;

            let event_id = created_event.id.ok_or_else(|| {
                CalendarStoreError::Internal("created event has no id".to_string())
            })?;
            info!("Created event {} in calendar '{}'", event_id, calendar_id);
            Ok(CreatedEvent {
                event_id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    fn calendar_time_zone(
        &self,
        calendar_id: &str,
    ) -> BoxFuture<'_, Option<String>, CalendarStoreError> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, calendar) = calendar_hub
                .calendars()
                .get(&calendar_id)
                .doit()
                .await
                .map_err(classify_api_error)?;
            Ok(calendar.time_zone)
        })
    }
}

/// In-memory calendar store used by tests and local runs.
pub mod mock {
    use super::*;
    use crate::availability::{parse_utc, TimeInterval};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;

    #[derive(Default)]
    struct State {
        events: HashMap<String, Vec<RawEvent>>,
        created: HashMap<String, Vec<EventSpec>>,
        time_zones: HashMap<String, String>,
        list_failure: Option<CalendarStoreError>,
        create_failure: Option<CalendarStoreError>,
        create_delay: Option<Duration>,
    }

    /// Mock calendar store: holds raw events per calendar and rejects
    /// overlapping bookings with [`CalendarStoreError::Conflict`].
    #[derive(Default)]
    pub struct MockCalendarStore {
        state: Mutex<State>,
        create_calls: AtomicUsize,
    }

    impl MockCalendarStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        pub fn add_event(&self, calendar_id: &str, event: RawEvent) {
            self.state()
                .events
                .entry(calendar_id.to_string())
                .or_default()
                .push(event);
        }

        pub fn add_timed_event(&self, calendar_id: &str, start: &str, end: &str) {
            self.add_event(
                calendar_id,
                RawEvent {
                    start: EventTime::date_time(start),
                    end: EventTime::date_time(end),
                    ..Default::default()
                },
            );
        }

        pub fn add_all_day_event(&self, calendar_id: &str, date: &str, end_date: &str) {
            self.add_event(
                calendar_id,
                RawEvent {
                    start: EventTime::date(date),
                    end: EventTime::date(end_date),
                    ..Default::default()
                },
            );
        }

        pub fn set_time_zone(&self, calendar_id: &str, time_zone: &str) {
            self.state()
                .time_zones
                .insert(calendar_id.to_string(), time_zone.to_string());
        }

        pub fn fail_list_with(&self, err: CalendarStoreError) {
            self.state().list_failure = Some(err);
        }

        pub fn fail_create_with(&self, err: CalendarStoreError) {
            self.state().create_failure = Some(err);
        }

        pub fn delay_create_by(&self, delay: Duration) {
            self.state().create_delay = Some(delay);
        }

        /// Number of create attempts, including rejected ones.
        pub fn create_calls(&self) -> usize {
            self.create_calls.load(Ordering::SeqCst)
        }

        pub fn created_events(&self, calendar_id: &str) -> Vec<EventSpec> {
            self.state()
                .created
                .get(calendar_id)
                .cloned()
                .unwrap_or_default()
        }
    }

    fn timed_interval(event: &RawEvent) -> Option<TimeInterval> {
        let start = parse_utc(event.start.date_time.as_deref()?)?;
        let end = parse_utc(event.end.date_time.as_deref()?)?;
        TimeInterval::new(start, end)
    }

    impl CalendarStore for MockCalendarStore {
        fn list_events(
            &self,
            calendar_id: &str,
            time_min: DateTime<Utc>,
            time_max: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<RawEvent>, CalendarStoreError> {
            let calendar_id = calendar_id.to_string();

            Box::pin(async move {
                let state = self.state();
                if let Some(err) = state.list_failure.clone() {
                    return Err(err);
                }
                let window = TimeInterval::new(time_min, time_max);
                let events = state
                    .events
                    .get(&calendar_id)
                    .map(|events| {
                        events
                            .iter()
                            .filter(|event| match (timed_interval(event), window) {
                                (Some(interval), Some(window)) => interval.overlaps(&window),
                                // all-day and malformed events pass through untouched
                                _ => true,
                            })
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(events)
            })
        }

        fn create_event(
            &self,
            calendar_id: &str,
            event: EventSpec,
        ) -> BoxFuture<'_, CreatedEvent, CalendarStoreError> {
            let calendar_id = calendar_id.to_string();

            Box::pin(async move {
                self.create_calls.fetch_add(1, Ordering::SeqCst);
                let delay = self.state().create_delay;
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                let mut state = self.state();
                if let Some(err) = state.create_failure.clone() {
                    return Err(err);
                }
                let requested = TimeInterval::new(event.start, event.end).ok_or_else(|| {
                    CalendarStoreError::Api {
                        status: Some(400),
                        message: "The specified time range is empty.".to_string(),
                    }
                })?;
                let clashes = state
                    .events
                    .get(&calendar_id)
                    .into_iter()
                    .flatten()
                    .filter_map(timed_interval)
                    .any(|busy| busy.overlaps(&requested));
                if clashes {
                    return Err(CalendarStoreError::Conflict);
                }

                let event_id = format!("mock-event-{}", uuid::Uuid::new_v4());
                state
                    .events
                    .entry(calendar_id.clone())
                    .or_default()
                    .push(RawEvent {
                        id: Some(event_id.clone()),
                        summary: Some(event.summary.clone()),
                        start: EventTime::date_time(format_utc(&event.start)),
                        end: EventTime::date_time(format_utc(&event.end)),
                    });
                state.created.entry(calendar_id).or_default().push(event);

                Ok(CreatedEvent {
                    event_id,
                    status: "confirmed".to_string(),
                })
            })
        }

        fn calendar_time_zone(
            &self,
            calendar_id: &str,
        ) -> BoxFuture<'_, Option<String>, CalendarStoreError> {
            let time_zone = self.state().time_zones.get(calendar_id).cloned();
            Box::pin(async move { Ok(time_zone) })
        }
    }
}
