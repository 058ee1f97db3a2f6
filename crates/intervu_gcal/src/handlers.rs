// File: crates/intervu_gcal/src/handlers.rs
use crate::availability::FreeSlot;
use crate::booking::{BookingOutcome, BookingRequest};
use crate::scheduler::InterviewScheduler;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use intervu_common::{HttpStatusCode, IntervuError};
use intervu_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

// Shared state for the scheduling handlers
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub scheduler: Arc<InterviewScheduler>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct SlotsQuery {
    /// Calendar to inspect; the configured default when absent.
    pub calendar_id: Option<String>,
    /// Horizon length in days; the configured horizon when absent.
    pub days_ahead: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    pub error: String,
}

/// Absent or null fields reach the booking validator as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookInterviewRequest {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub candidate_email: Option<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl From<BookInterviewRequest> for BookingRequest {
    fn from(req: BookInterviewRequest) -> Self {
        BookingRequest {
            start: req.start_time.unwrap_or_default(),
            end: req.end_time.unwrap_or_default(),
            candidate_email: req.candidate_email.unwrap_or_default(),
            calendar_id: req.calendar_id.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub message: String,
}

impl From<&BookingOutcome> for BookingResponse {
    fn from(outcome: &BookingOutcome) -> Self {
        BookingResponse {
            success: outcome.is_success(),
            event_id: outcome.event_id().map(str::to_string),
            message: outcome.message(),
        }
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Handler to list free interview slots.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Free slots within working hours", body = [FreeSlot]),
        (status = 502, description = "Calendar events could not be fetched", body = ErrorResponse),
        (status = 503, description = "Calendar not connected", body = ErrorResponse)
    ),
    tag = "Interviews"
))]
pub async fn get_slots_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<FreeSlot>>, (StatusCode, Json<ErrorResponse>)> {
    match state
        .scheduler
        .get_free_slots(query.calendar_id.as_deref(), query.days_ahead)
        .await
    {
        Ok(slots) => Ok(Json(slots)),
        Err(e) => {
            let message = e.to_string();
            let status = status_from(IntervuError::from(e).status_code());
            info!("Free slot lookup failed ({}): {}", status, message);
            Err((status, Json(ErrorResponse { error: message })))
        }
    }
}

/// Handler to book an interview for a candidate.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/interviews",
    request_body = BookInterviewRequest,
    responses(
        (status = 200, description = "Interview booked", body = BookingResponse),
        (status = 400, description = "Invalid timestamps, email or range", body = BookingResponse),
        (status = 409, description = "Slot already taken", body = BookingResponse),
        (status = 502, description = "Calendar API error", body = BookingResponse),
        (status = 503, description = "Calendar not connected", body = BookingResponse)
    ),
    tag = "Interviews"
))]
pub async fn book_interview_handler(
    State(state): State<Arc<GcalState>>,
    Json(payload): Json<BookInterviewRequest>,
) -> (StatusCode, Json<BookingResponse>) {
    let outcome = state.scheduler.book_interview(payload.into()).await;
    let status = match outcome.failure_reason() {
        None => StatusCode::OK,
        Some(reason) => status_from(reason.status_code()),
    };
    (status, Json(BookingResponse::from(&outcome)))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = String)),
    tag = "Interviews"
))]
pub async fn health_handler() -> &'static str {
    "ok"
}
