//! Test fixtures for scheduling tests
//!
//! Factory functions shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use intervu_common::services::{
    BoxFuture, BoxedError, CalendarStore, NotificationResult, NotificationService,
};
use intervu_gcal::availability::format_utc;
use intervu_gcal::booking::BookingRequest;
use intervu_gcal::scheduler::{InterviewScheduler, SchedulingSettings};
use intervu_gcal::service::mock::MockCalendarStore;
use std::sync::{Arc, Mutex};

/// Notifier that records every recipient.
#[derive(Default)]
pub struct RecordingNotifier {
    pub recipients: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn recipients(&self) -> Vec<String> {
        let mut recipients = self.recipients.lock().unwrap().clone();
        recipients.sort();
        recipients
    }
}

impl NotificationService for RecordingNotifier {
    fn send_email(
        &self,
        to: &str,
        _subject: &str,
        _body: &str,
    ) -> BoxFuture<'_, NotificationResult, BoxedError> {
        self.recipients.lock().unwrap().push(to.to_string());
        Box::pin(async {
            Ok(NotificationResult {
                id: None,
                status: "sent".to_string(),
            })
        })
    }
}

/// A scheduler over a fresh mock calendar with default settings.
pub fn create_scheduler() -> (
    InterviewScheduler,
    Arc<MockCalendarStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(MockCalendarStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = InterviewScheduler::new(
        Some(store.clone() as Arc<dyn CalendarStore>),
        notifier.clone(),
        SchedulingSettings::default(),
    );
    (scheduler, store, notifier)
}

/// A booking request for `[start, start + minutes)`.
pub fn create_booking_request(start: DateTime<Utc>, minutes: i64, email: &str) -> BookingRequest {
    BookingRequest {
        start: format_utc(&start),
        end: format_utc(&(start + Duration::minutes(minutes))),
        candidate_email: email.to_string(),
        calendar_id: "primary".to_string(),
    }
}
