// File: crates/intervu_gcal/src/auth.rs
use crate::service::GoogleCalendarStore;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use intervu_common::services::CalendarStore;
use intervu_config::{AppConfig, GcalConfig};
use std::sync::Arc;
use std::{error::Error, path::Path};
use tracing::{info, warn};

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds an authenticated Calendar hub from the service-account key at `gcal.key_path`.
pub async fn create_calendar_hub(
    config: &GcalConfig,
) -> Result<HubType, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in GcalConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    Ok(CalendarHub::new(client, auth))
}

/// Connects the calendar store described by `config`.
///
/// Returns `None` when Google Calendar is disabled, unconfigured, or the hub
/// cannot be built; callers then report the calendar as unavailable.
pub async fn connect_calendar_store(config: &AppConfig) -> Option<Arc<dyn CalendarStore>> {
    if !config.use_gcal {
        info!("Google Calendar disabled by configuration (use_gcal = false).");
        return None;
    }
    let Some(gcal_config) = config.gcal.as_ref() else {
        warn!("use_gcal is set but the [gcal] section is missing.");
        return None;
    };

    match create_calendar_hub(gcal_config).await {
        Ok(hub) => {
            info!("Google Calendar service created successfully.");
            Some(Arc::new(GoogleCalendarStore::new(Arc::new(hub))))
        }
        Err(e) => {
            warn!("Could not create Google Calendar service: {}", e);
            None
        }
    }
}
