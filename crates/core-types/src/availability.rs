use serde::{Serialize, Serializer};

/// The marker written in place of a metric that could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// A value that is either present or explicitly marked as unavailable.
///
/// Serializes as the inner value, or as the string `"N/A"` when unavailable,
/// which is the shape portfolio clients already consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Availability<T> {
    Available(T),
    NotAvailable,
}

impl<T> Availability<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }
}

impl<T> From<Option<T>> for Availability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Availability::Available(value),
            None => Availability::NotAvailable,
        }
    }
}

impl<T: Serialize> Serialize for Availability<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Availability::Available(value) => value.serialize(serializer),
            Availability::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}
