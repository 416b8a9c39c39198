use std::env;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use validator::Validate;

use crate::errors::ClientError;

/// Default values for configuration
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_INVENTORY_PAGE_SIZE: usize = 7;
const DEFAULT_REQUEST_PAGE_SIZE: usize = 10;
const CONFIG_DIR: &str = "config";
const SESSION_FILE_NAME: &str = "session.json";

/// Client configuration with validation.
///
/// Sources, later ones winning: built-in defaults, `config/default.toml`,
/// `config/<env>.toml` selected by `RUN_ENV`, then `STATIONERY__*`
/// environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the backend, including the `/api` prefix
    #[serde(default = "default_api_url")]
    #[validate(url)]
    pub api_url: String,

    /// Where the session (tokens + serialized user) is persisted.
    /// Defaults to `$HOME/.stationery/session.json`.
    #[serde(default)]
    pub session_file: Option<PathBuf>,

    /// Page size for inventory tables
    #[serde(default = "default_inventory_page_size")]
    #[validate(range(min = 1))]
    pub inventory_page_size: usize,

    /// Page size for the request queue
    #[serde(default = "default_request_page_size")]
    #[validate(range(min = 1))]
    pub request_page_size: usize,

    /// Log level for the crate's tracing output
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_inventory_page_size() -> usize {
    DEFAULT_INVENTORY_PAGE_SIZE
}

fn default_request_page_size() -> usize {
    DEFAULT_REQUEST_PAGE_SIZE
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: None,
            inventory_page_size: default_inventory_page_size(),
            request_page_size: default_request_page_size(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl ClientConfig {
    /// Resolved session file path, honoring `STATIONERY_HOME` the way the
    /// explicit `session_file` setting does.
    pub fn session_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.session_file {
            return Some(path.clone());
        }
        if let Ok(dir) = env::var("STATIONERY_HOME") {
            let mut path = PathBuf::from(dir);
            path.push(SESSION_FILE_NAME);
            return Some(path);
        }
        env::var("HOME").ok().map(|home| {
            let mut path = PathBuf::from(home);
            path.push(".stationery");
            path.push(SESSION_FILE_NAME);
            path
        })
    }

    /// Trailing-slash-insensitive join of `path` onto the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<ConfigLoadError> for ClientError {
    fn from(err: ConfigLoadError) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Loads and validates the client configuration.
pub fn load_config() -> Result<ClientConfig, ConfigLoadError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("api_url", DEFAULT_API_URL)?
        .set_default("inventory_page_size", DEFAULT_INVENTORY_PAGE_SIZE as i64)?
        .set_default("request_page_size", DEFAULT_REQUEST_PAGE_SIZE as i64)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("STATIONERY").separator("__"))
        .build()?;

    let cfg: ClientConfig = config.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Initializes tracing for the CLI. Honors `RUST_LOG` when set, otherwise
/// scopes the configured level to this crate.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("stationery_client={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}
