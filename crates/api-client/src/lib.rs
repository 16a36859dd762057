use crate::error::ApiError;
use async_trait::async_trait;
use core_types::RawNavRecord;
use reqwest::{StatusCode, Url};
use std::collections::BTreeMap;
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{SchemeCode, SchemeListing, SchemeMeta, SchemeResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.mfapi.in";

/// The abstract interface to a source of historical valuations.
///
/// An unknown or unavailable instrument is reported as empty data, never as
/// an error. `Err` is reserved for transport failures, which callers are
/// expected to degrade on as well.
#[async_trait]
pub trait ValuationSource: Send + Sync {
    /// Fetches the full scheme directory as `scheme code -> scheme name`.
    async fn list_schemes(&self) -> Result<BTreeMap<String, String>, ApiError>;

    /// Fetches descriptive metadata for one scheme.
    async fn scheme_meta(&self, scheme_code: &str) -> Result<SchemeMeta, ApiError>;

    /// Fetches the raw NAV history for one scheme, in source order.
    async fn historical_nav(&self, scheme_code: &str) -> Result<Vec<RawNavRecord>, ApiError>;

    /// Case-insensitive substring search over scheme names. An empty query matches everything.
    async fn search_schemes(&self, query: &str) -> Result<BTreeMap<String, String>, ApiError> {
        let schemes = self.list_schemes().await?;
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(schemes);
        }
        Ok(schemes
            .into_iter()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .collect())
    }
}

/// A `ValuationSource` backed by the public mfapi.in NAV API.
#[derive(Debug, Clone)]
pub struct MfApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl MfApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds `{base}/mf[/{code}]`, escaping the code as a single path segment.
    fn endpoint(&self, scheme_code: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("mf");
            if let Some(code) = scheme_code {
                segments.push(code.trim());
            }
        }
        url
    }

    /// Fetches `GET /mf/{code}`. A non-success status means the scheme is unavailable.
    async fn fetch_scheme(&self, scheme_code: &str) -> Result<SchemeResponse, ApiError> {
        let url = self.endpoint(Some(scheme_code));
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            log_unavailable(scheme_code, status);
            return Ok(SchemeResponse::default());
        }

        let text = response.text().await?;
        serde_json::from_str::<SchemeResponse>(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

fn log_unavailable(scheme_code: &str, status: StatusCode) {
    tracing::warn!(scheme_code, %status, "Valuation source reported scheme as unavailable.");
}

#[async_trait]
impl ValuationSource for MfApiClient {
    async fn list_schemes(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let response = self.client.get(self.endpoint(None)).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(%status, "Valuation source failed to list schemes.");
            return Ok(BTreeMap::new());
        }

        let text = response.text().await?;
        let listings: Vec<SchemeListing> = serde_json::from_str(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        Ok(listings
            .into_iter()
            .map(|l| (l.scheme_code.to_string(), l.scheme_name))
            .collect())
    }

    async fn scheme_meta(&self, scheme_code: &str) -> Result<SchemeMeta, ApiError> {
        Ok(self.fetch_scheme(scheme_code).await?.meta)
    }

    async fn historical_nav(&self, scheme_code: &str) -> Result<Vec<RawNavRecord>, ApiError> {
        let records = self.fetch_scheme(scheme_code).await?.data;
        tracing::debug!(scheme_code, records = records.len(), "Fetched NAV history.");
        Ok(records)
    }
}
