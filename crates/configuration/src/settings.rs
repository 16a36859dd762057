use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub valuation_source: ValuationSourceConfig,
    pub analytics: AnalyticsConfig,
    pub portfolio: PortfolioConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// The remote NAV API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuationSourceConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ValuationSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mfapi.in".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Parameters of the analytics calculations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Periods per year used to annualize daily statistics.
    pub trading_days_per_year: u32,
    /// Annual risk-free rate subtracted in the Sharpe ratio (0.06 = 6%).
    pub risk_free_rate: f64,
    pub num_simulations: usize,
    pub horizon_days: usize,
    /// How many independent batches the simulation axis is split into.
    pub simulation_batches: usize,
    /// Fixes the Monte Carlo generator. Unset means a fresh seed per request.
    pub seed: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            risk_free_rate: 0.06,
            num_simulations: 1000,
            horizon_days: 252,
            simulation_batches: 8,
            seed: None,
        }
    }
}

/// Fan-out limits for the portfolio summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub max_concurrent_fetches: usize,
    #[serde(with = "humantime_serde")]
    pub holding_timeout: Duration,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            holding_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "navscope.log".to_string(),
        }
    }
}
