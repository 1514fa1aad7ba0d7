use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

/// Application configuration, layered from `config/default.toml`, an optional
/// environment-specific file and `APP__*` environment variables.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection string
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub database_url: String,

    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[validate(range(min = 1, message = "Port must be greater than 0"))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name: development, staging, production
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines
    #[serde(default)]
    pub log_json: bool,

    /// Run pending migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    #[serde(default = "default_db_connect_timeout")]
    pub db_connect_timeout_seconds: u64,

    #[serde(default = "default_db_idle_timeout")]
    pub db_idle_timeout_seconds: u64,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: String,

    /// Allow any origin (development only)
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default)]
    pub cors_allow_credentials: bool,

    #[serde(default = "default_page_size")]
    pub api_default_page_size: u64,

    #[serde(default = "default_max_page_size")]
    pub api_max_page_size: u64,

    /// ISO 4217 currency code used for all prices
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_db_connect_timeout() -> u64 {
    10
}

fn default_db_idle_timeout() -> u64 {
    300
}

fn default_page_size() -> u64 {
    20
}

fn default_max_page_size() -> u64 {
    100
}

fn default_currency() -> String {
    "USD".to_string()
}

impl AppConfig {
    /// Minimal configuration for tests and embedded use.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            host: default_host(),
            port: default_port(),
            environment: "test".to_string(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_seconds: default_db_connect_timeout(),
            db_idle_timeout_seconds: default_db_idle_timeout(),
            cors_allowed_origins: String::new(),
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            api_default_page_size: default_page_size(),
            api_max_page_size: default_max_page_size(),
            default_currency: default_currency(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Allowed origins split and trimmed; empty entries dropped.
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Load configuration in layers. Later layers override earlier ones:
/// `config/default.toml`, then `config/{RUN_ENV}.toml`, then `APP__*`
/// environment variables (e.g. `APP__DATABASE_URL`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_default("environment", run_env)?
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("Invalid configuration: {}", e)))?;

    Ok(app_config)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let config = AppConfig::new("sqlite::memory:");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_default_page_size, 20);
        assert_eq!(config.default_currency, "USD");
        assert!(config.auto_migrate);
        assert!(!config.cors_allow_any_origin);
    }

    #[test]
    fn validation_rejects_empty_database_url() {
        let config = AppConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn allowed_origins_splits_and_trims() {
        let mut config = AppConfig::new("sqlite::memory:");
        config.cors_allowed_origins =
            "https://shop.example.com, https://admin.example.com,".to_string();
        assert_eq!(
            config.allowed_origins(),
            vec![
                "https://shop.example.com".to_string(),
                "https://admin.example.com".to_string()
            ]
        );

        config.cors_allowed_origins = String::new();
        assert!(config.allowed_origins().is_empty());
    }
}
