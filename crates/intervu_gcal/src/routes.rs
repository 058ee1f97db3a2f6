// --- File: crates/intervu_gcal/src/routes.rs ---

use crate::auth::connect_calendar_store;
use crate::handlers::{book_interview_handler, get_slots_handler, health_handler, GcalState};
use crate::scheduler::{InterviewScheduler, SchedulingSettings};
use axum::{
    routing::{get, post},
    Router,
};
use intervu_common::services::NotificationService;
use intervu_common::IntervuError;
use intervu_config::AppConfig;
use std::sync::Arc;

/// Router for the scheduling endpoints, relative to the `/api` mount point.
pub fn routes(state: Arc<GcalState>) -> Router {
    Router::new()
        .route("/slots", get(get_slots_handler))
        .route("/interviews", post(book_interview_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Builds the scheduler from `config` (connecting Google Calendar if enabled)
/// and returns the router serving it.
pub async fn routes_from_config(
    config: Arc<AppConfig>,
    notifier: Arc<dyn NotificationService>,
) -> Result<Router, IntervuError> {
    let mut settings = SchedulingSettings::from_config(&config.scheduling)?;
    if let Some(calendar_id) = config.gcal.as_ref().and_then(|g| g.calendar_id.clone()) {
        settings.default_calendar_id = calendar_id;
    }
    let calendar = connect_calendar_store(&config).await;
    let scheduler = Arc::new(InterviewScheduler::new(calendar, notifier, settings));

    Ok(routes(Arc::new(GcalState { config, scheduler })))
}
