use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::Path;
use tracing::debug;

pub mod models;
pub use models::*;

/// Marker value replaced by an environment variable when the config is loaded.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the configuration for the current process.
///
/// Sources, later ones overriding earlier ones:
/// `$CONFIG_DIR/default.*`, `$CONFIG_DIR/$RUN_ENV.*` and `INTERVU_*` environment
/// variables (`__` separates nested keys, e.g. `INTERVU_SERVER__PORT`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    load_config_from(Path::new(&config_dir), &run_env)
}

/// Loads the layered configuration rooted at `config_dir`.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix("INTERVU")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Parses a TOML document into an [`AppConfig`], resolving secret markers.
pub fn load_config_from_toml(content: &str) -> Result<AppConfig, ConfigError> {
    let raw_config: AppConfig = Config::builder()
        .add_source(File::from_str(content, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                if let Ok(env_val) = env::var(&env_key) {
                    *obj = Value::String(env_val);
                } else {
                    debug!("env var {} not found for {}", env_key, SECRET_FROM_ENV);
                    *obj = Value::Null;
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in the config.
///
/// A marker whose variable is missing becomes `null`, so optional secrets read as `None`.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json =
        serde_json::to_value(&config).map_err(|err| ConfigError::Message(err.to_string()))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json).map_err(|err| ConfigError::Message(err.to_string()))
}

/// Environment variables for enabled integrations whose secret is unset.
///
/// Config loading runs before logging is initialized, so callers report these
/// once the subscriber is installed.
pub fn missing_secrets(config: &AppConfig) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.use_gcal && config.gcal.as_ref().and_then(|g| g.key_path.as_ref()).is_none() {
        missing.push("GCAL_KEY_PATH");
    }
    if config.use_mail && config.mail.as_ref().and_then(|m| m.api_key.as_ref()).is_none() {
        missing.push("MAIL_API_KEY");
    }
    missing
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file is `$DOTENV_OVERRIDE` if set, otherwise the first command line
/// argument when it starts with ".env", otherwise ".env". Loading happens once
/// per process; the chosen path is returned.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = load_config_from_toml("").unwrap();
        assert!(!config.use_gcal);
        assert_eq!(config.server.port, 8086);
        assert_eq!(config.scheduling.horizon_days, 14);
        assert_eq!(config.scheduling.work_start, "09:00");
        assert_eq!(config.scheduling.working_days.len(), 7);
        assert_eq!(config.scheduling.time_zone, "UTC");
    }

    #[test]
    fn sections_override_defaults() {
        let config = load_config_from_toml(
            r#"
            use_gcal = true

            [server]
            host = "0.0.0.0"
            port = 9000

            [gcal]
            key_path = "secrets/service_account.json"
            calendar_id = "hiring@example.com"

            [scheduling]
            recruiter_email = "lead@example.com"
            horizon_days = 7
            working_days = ["Mon", "Tue"]
            "#,
        )
        .unwrap();

        assert!(config.use_gcal);
        assert_eq!(config.server.host, "0.0.0.0");
        let gcal = config.gcal.unwrap();
        assert_eq!(gcal.calendar_id.as_deref(), Some("hiring@example.com"));
        assert_eq!(config.scheduling.recruiter_email, "lead@example.com");
        assert_eq!(config.scheduling.horizon_days, 7);
        assert_eq!(config.scheduling.working_days, vec!["Mon", "Tue"]);
        // untouched fields keep their defaults
        assert_eq!(config.scheduling.booking_timeout_secs, 30);
    }

    #[test]
    fn secret_marker_is_resolved_from_env() {
        env::set_var("MAIL_API_KEY", "key-from-env");
        let config = load_config_from_toml(
            r#"
            [mail]
            api_url = "https://mail.example.com/send"
            api_key = "secret_from_env"
            sender = "bot@example.com"
            "#,
        )
        .unwrap();
        let mail = config.mail.unwrap();
        assert_eq!(mail.api_key.as_deref(), Some("key-from-env"));
        assert_eq!(mail.sender.as_deref(), Some("bot@example.com"));
    }

    #[test]
    fn missing_secret_becomes_none() {
        env::remove_var("GCAL_KEY_PATH");
        let config = load_config_from_toml(
            r#"
            [gcal]
            key_path = "secret_from_env"
            calendar_id = "primary"
            "#,
        )
        .unwrap();
        let gcal = config.gcal.unwrap();
        assert_eq!(gcal.key_path, None);
        assert_eq!(gcal.calendar_id.as_deref(), Some("primary"));
    }

    #[test]
    fn missing_secrets_only_for_enabled_integrations() {
        let mut config = AppConfig::default();
        assert!(missing_secrets(&config).is_empty());

        config.use_gcal = true;
        config.use_mail = true;
        config.gcal = Some(GcalConfig {
            key_path: None,
            calendar_id: Some("primary".to_string()),
        });
        assert_eq!(missing_secrets(&config), vec!["GCAL_KEY_PATH", "MAIL_API_KEY"]);

        config.gcal = Some(GcalConfig {
            key_path: Some("secrets/service_account.json".to_string()),
            calendar_id: None,
        });
        config.mail = Some(MailConfig {
            api_url: "https://mail.example.com/send".to_string(),
            sender: None,
            api_key: Some("key".to_string()),
        });
        assert!(missing_secrets(&config).is_empty());
    }

    #[test]
    fn missing_config_dir_yields_defaults() {
        let config = load_config_from(Path::new("does/not/exist"), "debug").unwrap();
        assert_eq!(config.scheduling.default_calendar_id, "primary");
    }
}
