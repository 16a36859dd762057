use core_types::RawNavRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of `GET /mf`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeListing {
    pub scheme_code: SchemeCode,
    pub scheme_name: String,
}

/// Scheme codes arrive as JSON numbers, occasionally as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemeCode {
    Number(u64),
    Text(String),
}

impl fmt::Display for SchemeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeCode::Number(code) => write!(f, "{code}"),
            SchemeCode::Text(code) => f.write_str(code),
        }
    }
}

/// The body of `GET /mf/{code}`: metadata plus the NAV history, newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeResponse {
    #[serde(default)]
    pub meta: SchemeMeta,
    #[serde(default)]
    pub data: Vec<RawNavRecord>,
}

/// Descriptive metadata for a scheme. Opaque to the analytics core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_house: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_code: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_growth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin_div_reinvestment: Option<String>,
}
