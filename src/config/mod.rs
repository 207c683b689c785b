use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_DATASET_PATH: &str = "data/user_data.csv";
const DEFAULT_PREFERENCES_PATH: &str = ".nutritrack/preferences.json";

/// Distinguishes runtime behavior for different stages of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let dataset_path = path_var("NUTRITRACK_DATASET", DEFAULT_DATASET_PATH)?;
        let preferences_path = path_var("NUTRITRACK_PREFERENCES", DEFAULT_PREFERENCES_PATH)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig {
                dataset_path,
                preferences_path,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn path_var(variable: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    let value = env::var(variable).unwrap_or_else(|_| default.to_string());
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyPath { variable });
    }
    Ok(PathBuf::from(value))
}

/// Locations of the bundled roster table and the local preference file.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub dataset_path: PathBuf,
    pub preferences_path: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyPath { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPath { variable } => {
                write!(f, "{variable} must name a file path when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
