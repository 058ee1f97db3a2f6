// File: crates/intervu_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::availability::FreeSlot;
use crate::booking::ErrorKind;
use crate::handlers::{BookInterviewRequest, BookingResponse, ErrorResponse, SlotsQuery};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_slots_handler,
        crate::handlers::book_interview_handler,
        crate::handlers::health_handler
    ),
    components(
        schemas(
            FreeSlot,
            ErrorKind,
            SlotsQuery,
            BookInterviewRequest,
            BookingResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Interviews", description = "Interview availability and booking API")
    ),
    servers(
        (url = "/api", description = "Intervu API server")
    )
)]
pub struct GcalApiDoc;
