//! # Navscope Analytics Engine
//!
//! This crate turns a raw valuation history into the statistics served to
//! clients: periodic returns, annualized risk metrics, Monte Carlo projections,
//! the monthly performance heatmap, drawdown and rolling volatility, and
//! multi-series comparisons.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every transformation is a function of its inputs. Randomness
//!   only enters through a generator passed in by the caller, so simulations are reproducible.
//! - **Degrade, don't fail:** Malformed records and short series shrink the output instead of
//!   raising errors. The one distinguishable outcome is [`SimulationOutcome::InsufficientData`].
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: Holds the annualization parameters and exposes every calculation.
//! - `normalize`, `compute_returns`, `risk::compute_risk`, `monte_carlo::simulate`,
//!   `heatmap::monthly_heatmap`, `drawdown::max_drawdown`, `rolling::rolling_volatility`,
//!   `align::align_series`: the individual transformations.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod align;
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod heatmap;
pub mod monte_carlo;
pub mod normalize;
pub mod report;
pub mod returns;
pub mod risk;
pub mod rolling;
mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use align::align_series;
pub use drawdown::max_drawdown;
pub use engine::{AnalyticsEngine, RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};
pub use error::AnalyticsError;
pub use heatmap::monthly_heatmap;
pub use monte_carlo::{SimulationParams, simulate};
pub use normalize::normalize;
pub use report::{
    ComparisonRow, DatedReturn, HeatmapEntry, RiskMetrics, RollingVolatilityPoint,
    SimulationOutcome, SimulationResult,
};
pub use returns::compute_returns;
pub use risk::RiskParams;
pub use rolling::{DEFAULT_ROLLING_WINDOW, rolling_volatility};
