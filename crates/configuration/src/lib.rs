use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalyticsConfig, Config, DatabaseConfig, LogFormat, LoggingConfig, PortfolioConfig,
    ServerConfig, ValuationSourceConfig,
};

/// Prefix of environment overrides, e.g. `NAVSCOPE_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "NAVSCOPE";

/// The settings file read when no other path is given.
pub const DEFAULT_CONFIG_FILE: &str = "navscope.toml";

/// Loads the application configuration.
///
/// Built-in defaults are overlaid by the TOML file at `path` (if given and
/// present) and then by `NAVSCOPE_*` environment variables. The result is
/// validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize::<Config>()?;

    validate(&config)?;
    Ok(config)
}

/// Parses configuration from TOML text alone, without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let checks = [
        (config.server.port != 0, "server.port must be non-zero"),
        (
            config.analytics.trading_days_per_year > 0,
            "analytics.trading_days_per_year must be positive",
        ),
        (
            config.analytics.risk_free_rate.is_finite(),
            "analytics.risk_free_rate must be a finite number",
        ),
        (config.analytics.num_simulations > 0, "analytics.num_simulations must be positive"),
        (config.analytics.horizon_days > 0, "analytics.horizon_days must be positive"),
        (
            config.analytics.simulation_batches > 0,
            "analytics.simulation_batches must be positive",
        ),
        (
            config.portfolio.max_concurrent_fetches > 0,
            "portfolio.max_concurrent_fetches must be positive",
        ),
    ];

    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => Err(ConfigError::ValidationError(message.to_string())),
        None => Ok(()),
    }
}
