use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::scoring::{ScoreRange, ScoringOptions};

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the scoring service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringOptions,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let results_path = env::var("MCDA_RESULTS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let score_range = env::var("MCDA_SCORE_RANGE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_score_range(&value))
            .transpose()?;

        let round_decimals = env::var("MCDA_ROUND_DECIMALS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_round_decimals(&value))
            .transpose()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            storage: StorageConfig { results_path },
            scoring: ScoringOptions {
                score_range,
                round_decimals,
            },
        })
    }
}

fn parse_score_range(raw: &str) -> Result<ScoreRange, ConfigError> {
    let invalid = || ConfigError::InvalidScoreRange {
        value: raw.to_string(),
    };
    let (low, high) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let low = low.trim().parse::<f64>().map_err(|_| invalid())?;
    let high = high.trim().parse::<f64>().map_err(|_| invalid())?;
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(invalid());
    }
    Ok(ScoreRange { low, high })
}

fn parse_round_decimals(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(decimals) if decimals <= 15 => Ok(decimals),
        _ => Err(ConfigError::InvalidRoundDecimals {
            value: raw.to_string(),
        }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter and formatting controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Where scoring results are kept. No path means an in-memory store.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub results_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScoreRange { value: String },
    InvalidRoundDecimals { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScoreRange { value } => write!(
                f,
                "MCDA_SCORE_RANGE must look like 'low-high' with low < high (got '{value}')"
            ),
            ConfigError::InvalidRoundDecimals { value } => write!(
                f,
                "MCDA_ROUND_DECIMALS must be an integer between 0 and 15 (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScoreRange { .. }
            | ConfigError::InvalidRoundDecimals { .. } => None,
        }
    }
}
