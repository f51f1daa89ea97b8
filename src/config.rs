use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BACKEND_BASE_URL: &str = "https://backend-smartsales365.onrender.com/api/v1";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub exports: ExportSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub max_request_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportSettings {
    pub download_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Self::defaults(Config::builder(), &environment)?
            // Add configuration files if they exist
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("SALES_CONSOLE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment)?
            .set_default("backend.base_url", DEFAULT_BACKEND_BASE_URL)?
            .set_default("backend.request_timeout_ms", 30_000)?
            .set_default("backend.max_request_bytes", 10 * 1024 * 1024)?
            .set_default("exports.download_dir", "downloads")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")
    }

    /// Defaults only, ignoring files and environment
    pub fn defaults_only() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder(), "development")?
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.eq_ignore_ascii_case("json")
    }
}
