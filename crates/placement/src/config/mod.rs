use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

type UrlParseError = <Url as std::str::FromStr>::Err;

pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7166";
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Distinguishes runtime behavior for different stages of the client.
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

/// Top-level configuration for the placement client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("PLACEMENT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = parse_base_url(
            &env::var("PLACEMENT_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let timeout_secs = env::var("PLACEMENT_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let accept_invalid_certs = match env::var("PLACEMENT_ACCEPT_INVALID_CERTS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "PLACEMENT_ACCEPT_INVALID_CERTS",
            })?,
            Err(_) => environment == AppEnvironment::Development,
        };

        let page_size = parse_page_size(
            &env::var("PLACEMENT_PAGE_SIZE").unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string()),
        )?;

        let session_file = env::var("PLACEMENT_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".placement-session.json"));

        let log_level = env::var("PLACEMENT_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
                accept_invalid_certs,
            },
            display: DisplayConfig { page_size },
            session: SessionConfig { file: session_file },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for reaching the placement REST backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    /// Configuration pointing at an explicit backend, used by tests and overrides.
    pub fn for_base_url(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(raw)?,
            timeout: Duration::from_secs(10),
            accept_invalid_certs: false,
        })
    }
}

/// Table rendering controls.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub page_size: usize,
}

/// Where a console session is kept between invocations.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub file: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::UnsupportedScheme(scheme.to_string())),
    }
}

pub fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|size| *size > 0)
        .ok_or(ConfigError::InvalidPageSize)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl {
        value: String,
        source: UrlParseError,
    },
    UnsupportedScheme(String),
    InvalidTimeout,
    InvalidPageSize,
    InvalidFlag {
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { value, .. } => {
                write!(f, "PLACEMENT_API_BASE_URL '{}' is not a valid URL", value)
            }
            ConfigError::UnsupportedScheme(scheme) => {
                write!(f, "PLACEMENT_API_BASE_URL must use http or https, found '{scheme}'")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PLACEMENT_HTTP_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "PLACEMENT_PAGE_SIZE must be a positive integer")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidBaseUrl { source, .. } => Some(source),
            _ => None,
        }
    }
}
