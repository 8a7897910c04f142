mod run;

pub use run::{
    AnswersSection, EligibilitySection, PacingSection, RunConfig, RunOverrides, RunSection,
    SearchSection, StorageSection, UploadsSection, WebDriverSection, SLOW_PACING_FACTOR,
};

use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default location of the run configuration document.
pub const DEFAULT_RUN_CONFIG: &str = "apply-pilot.toml";

/// Process-level configuration sourced from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run_config_path: PathBuf,
    pub webdriver_url: Option<String>,
    pub phone_number: Option<String>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_config_path = env::var("APPLY_PILOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RUN_CONFIG));
        let webdriver_url = non_empty_var("WEBDRIVER_URL");
        let phone_number = non_empty_var("PHONE_NUMBER");
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_file = non_empty_var("APP_LOG_FILE").map(PathBuf::from);

        if log_level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "APP_LOG_LEVEL must not be empty".to_string(),
            ));
        }

        Ok(Self {
            run_config_path,
            webdriver_url,
            phone_number,
            telemetry: TelemetryConfig {
                log_level,
                log_file,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Run log appended alongside stderr output.
    pub log_file: Option<PathBuf>,
}

/// Account secrets. Only ever read from the environment; never written or logged.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let username =
            non_empty_var("APPLY_PILOT_USERNAME").ok_or(ConfigError::MissingEnv("APPLY_PILOT_USERNAME"))?;
        let password =
            non_empty_var("APPLY_PILOT_PASSWORD").ok_or(ConfigError::MissingEnv("APPLY_PILOT_PASSWORD"))?;

        Ok(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    MissingEnv(&'static str),
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: String,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnv(key) => write!(f, "{key} must be set"),
            ConfigError::Read { path, .. } => {
                write!(f, "unable to read run configuration {}", path.display())
            }
            ConfigError::Parse { origin, source } => {
                write!(f, "invalid run configuration {origin}: {source}")
            }
            ConfigError::Invalid(reason) => write!(f, "invalid run configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::MissingEnv(_) | ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APPLY_PILOT_CONFIG");
        env::remove_var("WEBDRIVER_URL");
        env::remove_var("PHONE_NUMBER");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FILE");
        env::remove_var("APPLY_PILOT_USERNAME");
        env::remove_var("APPLY_PILOT_PASSWORD");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.run_config_path, PathBuf::from(DEFAULT_RUN_CONFIG));
        assert_eq!(config.webdriver_url, None);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_file, None);
    }

    #[test]
    fn load_reads_log_file_path() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LOG_FILE", "logs/apply-pilot.log");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.telemetry.log_file,
            Some(PathBuf::from("logs/apply-pilot.log"))
        );
        reset_env();
    }

    #[test]
    fn credentials_require_both_secrets() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APPLY_PILOT_USERNAME", "someone@example.com");

        match Credentials::from_env() {
            Err(ConfigError::MissingEnv("APPLY_PILOT_PASSWORD")) => {}
            other => panic!("expected missing password, got {other:?}"),
        }

        env::set_var("APPLY_PILOT_PASSWORD", "hunter2");
        let credentials = Credentials::from_env().expect("credentials load");
        assert_eq!(credentials.username, "someone@example.com");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("someone@example.com"));
        reset_env();
    }
}
