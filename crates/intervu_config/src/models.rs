// --- File: crates/intervu_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    /// Path to the service-account key JSON.
    pub key_path: Option<String>,
    /// Calendar used when a request does not name one.
    pub calendar_id: Option<String>,
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Always invited to booked interviews and notified on success.
    pub recruiter_email: String,
    pub default_calendar_id: String,
    pub horizon_days: u32,
    /// Upper bound for a requested `days_ahead`.
    pub max_horizon_days: u32,
    /// "HH:MM" in the scheduling time zone.
    pub work_start: String,
    pub work_end: String,
    /// Three-letter weekday names ("Mon" .. "Sun").
    pub working_days: Vec<String>,
    /// IANA zone name; all interval arithmetic happens here.
    pub time_zone: String,
    /// Prefer the zone the calendar itself reports over `time_zone`.
    pub use_calendar_time_zone: bool,
    pub booking_timeout_secs: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            recruiter_email: "recruiter@example.com".to_string(),
            default_calendar_id: "primary".to_string(),
            horizon_days: 14,
            max_horizon_days: 60,
            work_start: "09:00".to_string(),
            work_end: "17:00".to_string(),
            working_days: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            time_zone: "UTC".to_string(),
            use_calendar_time_zone: false,
            booking_timeout_secs: 30,
        }
    }
}

// --- Mail Config ---
// Holds the mail relay settings. The api key is usually "secret_from_env"
// and resolved from MAIL_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MailConfig {
    pub api_url: String,
    pub sender: Option<String>,
    pub api_key: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_mail: bool,

    #[serde(default)]
    pub log_level: Option<String>,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub scheduling: SchedulingConfig,
}
