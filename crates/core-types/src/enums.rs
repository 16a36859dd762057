use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of instrument a portfolio holding refers to.
///
/// Only mutual funds are backed by a valuation source; every other kind is
/// carried through the portfolio untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HoldingType {
    MutualFund,
    Stock,
    Crypto,
    Other(String),
}

impl HoldingType {
    pub fn as_str(&self) -> &str {
        match self {
            HoldingType::MutualFund => "mutual_fund",
            HoldingType::Stock => "stock",
            HoldingType::Crypto => "crypto",
            HoldingType::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_mutual_fund(&self) -> bool {
        matches!(self, HoldingType::MutualFund)
    }
}

impl FromStr for HoldingType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "mutual_fund" => HoldingType::MutualFund,
            "stock" => HoldingType::Stock,
            "crypto" => HoldingType::Crypto,
            other => HoldingType::Other(other.to_string()),
        })
    }
}

impl From<String> for HoldingType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<HoldingType> for String {
    fn from(value: HoldingType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for HoldingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
