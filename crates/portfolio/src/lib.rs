//! # Navscope Portfolio
//!
//! Turns a user's list of holdings into a per-holding analytics summary.
//!
//! Mutual fund holdings are fetched from a `ValuationSource` and run through
//! the `AnalyticsEngine`. Any other holding kind, and any holding that fails
//! or times out, is reported with its metrics marked unavailable.

pub mod error;
pub mod summarizer;
pub mod summary;

// --- Public API ---
pub use error::PortfolioError;
pub use summarizer::{PortfolioSummarizer, SummaryOptions};
pub use summary::{HoldingSummary, PortfolioSummary, RiskSummary, SimulationSummary};
