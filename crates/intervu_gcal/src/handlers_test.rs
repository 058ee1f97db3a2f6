#[cfg(test)]
mod tests {
    use crate::handlers::{BookingResponse, ErrorResponse, GcalState};
    use crate::routes::routes;
    use crate::scheduler::{InterviewScheduler, SchedulingSettings};
    use crate::service::mock::MockCalendarStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use intervu_common::services::{
        BoxFuture, BoxedError, CalendarStore, NotificationResult, NotificationService,
    };
    use intervu_config::AppConfig;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct SilentNotifier;

    impl NotificationService for SilentNotifier {
        fn send_email(
            &self,
            _to: &str,
            _subject: &str,
            _body: &str,
        ) -> BoxFuture<'_, NotificationResult, BoxedError> {
            Box::pin(async {
                Ok(NotificationResult {
                    id: None,
                    status: "sent".to_string(),
                })
            })
        }
    }

    fn app(store: Option<Arc<MockCalendarStore>>) -> Router {
        let scheduler = InterviewScheduler::new(
            store.map(|s| s as Arc<dyn CalendarStore>),
            Arc::new(SilentNotifier),
            SchedulingSettings::default(),
        );
        routes(Arc::new(GcalState {
            config: Arc::new(AppConfig::default()),
            scheduler: Arc::new(scheduler),
        }))
    }

    fn book(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/interviews")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(None)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_slots_without_calendar_is_503() {
        let response = app(None)
            .oneshot(Request::get("/slots").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorResponse = json(response).await;
        assert!(body.error.contains("not available"));
    }

    #[tokio::test]
    async fn test_slots_lists_free_windows() {
        let store = Arc::new(MockCalendarStore::new());
        let response = app(Some(store))
            .oneshot(
                Request::get("/slots?calendar_id=primary&days_ahead=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let slots: Vec<serde_json::Value> = json(response).await;
        assert_eq!(slots.len(), 3);
        let start = slots[0]["start"].as_str().unwrap();
        assert!(start.ends_with("T09:00:00Z"), "unexpected start {start}");
    }

    #[tokio::test]
    async fn test_book_interview_success() {
        let store = Arc::new(MockCalendarStore::new());
        let response = app(Some(store.clone()))
            .oneshot(book(
                r#"{"start_time":"2025-04-09T15:00:00Z","end_time":"2025-04-09T16:00:00Z","candidate_email":"ada@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: BookingResponse = json(response).await;
        assert!(body.success);
        assert!(body.event_id.is_some());
        assert!(body.message.starts_with("Success!"));
        assert_eq!(store.created_events("primary").len(), 1);
    }

    #[tokio::test]
    async fn test_book_interview_invalid_format_is_400() {
        let response = app(Some(Arc::new(MockCalendarStore::new())))
            .oneshot(book(
                r#"{"start_time":"not-a-date","end_time":"2025-04-09T16:00:00Z","candidate_email":"ada@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: BookingResponse = json(response).await;
        assert!(!body.success);
        assert!(body.message.starts_with("Failed"));
    }

    #[tokio::test]
    async fn test_slots_days_ahead_beyond_limit_is_400() {
        let store = Arc::new(MockCalendarStore::new());
        let response = app(Some(store))
            .oneshot(
                Request::get("/slots?days_ahead=4294967295")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json(response).await;
        assert!(body.error.contains("days_ahead"));
    }

    #[tokio::test]
    async fn test_book_interview_missing_email_is_400() {
        let store = Arc::new(MockCalendarStore::new());
        let response = app(Some(store.clone()))
            .oneshot(book(
                r#"{"start_time":"2025-04-09T15:00:00Z","end_time":"2025-04-09T16:00:00Z"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: BookingResponse = json(response).await;
        assert!(!body.success);
        assert!(body.message.starts_with("Failed"));
        assert!(store.created_events("primary").is_empty());
    }

    #[tokio::test]
    async fn test_book_interview_null_start_is_400() {
        let response = app(Some(Arc::new(MockCalendarStore::new())))
            .oneshot(book(
                r#"{"start_time":null,"end_time":"2025-04-09T16:00:00Z","candidate_email":"ada@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: BookingResponse = json(response).await;
        assert!(!body.success);
        assert!(body.message.starts_with("Failed"));
    }

    #[tokio::test]
    async fn test_book_interview_conflict_is_409() {
        let store = Arc::new(MockCalendarStore::new());
        store.add_timed_event("team", "2025-04-09T15:00:00Z", "2025-04-09T15:30:00Z");
        let response = app(Some(store))
            .oneshot(book(
                r#"{"start_time":"2025-04-09T15:00:00Z","end_time":"2025-04-09T16:00:00Z","candidate_email":"ada@example.com","calendar_id":"team"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_book_interview_without_calendar_is_503() {
        let response = app(None)
            .oneshot(book(
                r#"{"start_time":"2025-04-09T15:00:00Z","end_time":"2025-04-09T16:00:00Z","candidate_email":"ada@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
