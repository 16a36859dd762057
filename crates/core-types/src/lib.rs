pub mod availability;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use availability::Availability;
pub use enums::HoldingType;
pub use error::CoreError;
pub use structs::{
    Holding, RawNavRecord, RawNavValue, ReturnPoint, ReturnSeries, ValuationPoint,
    ValuationSeries,
};
