// File: services/intervu_backend/src/main.rs
use axum::{routing::get, Router};
use intervu_common::logging::parse_level;
use intervu_common::services::NotificationService;
use intervu_common::{config_error, init_with_level, IntervuError};
use intervu_config::{load_config, missing_secrets};
use intervu_gcal::routes as gcal_routes;
use intervu_mail::MailNotificationService;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Intervu backend stopped: {}", e);
            eprintln!("Intervu backend stopped: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), IntervuError> {
    let config = Arc::new(load_config().map_err(|e| config_error(format!("Failed to load config: {e}")))?);
    init_with_level(parse_level(config.log_level.as_deref().unwrap_or("info")));
    for var in missing_secrets(&config) {
        warn!("env var {} is not set, the integration that needs it will be unavailable", var);
    }

    let mail_config = if config.use_mail {
        config.mail.clone()
    } else {
        info!("Mail disabled by configuration (use_mail = false).");
        None
    };
    let notifier: Arc<dyn NotificationService> = Arc::new(MailNotificationService::new(mail_config));
    let gcal_router = gcal_routes::routes_from_config(config.clone(), notifier).await?;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the Intervu API!" }))
        .merge(gcal_router);

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use intervu_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Intervu API",
                version = "0.1.0",
                description = "Interview scheduling API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(GcalApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| config_error(format!("Cannot bind {addr}: {e}")))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| IntervuError::InternalError(format!("Server error: {e}")))
}
