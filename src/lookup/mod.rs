//! Locality → hospitals lookup.
//!
//! An ordered chain of [`HospitalSource`]s: remote geocode + POI search first,
//! then the static fallback table. The first non-empty answer wins. Failures
//! never escape the chain; they are logged and the next source is tried.

pub mod fallback;
pub mod geocode;
pub mod poi;
pub mod remote;

#[cfg(test)]
pub(crate) mod stub_server;

pub use fallback::*;
pub use geocode::*;
pub use poi::*;
pub use remote::*;

use std::sync::Arc;

use thiserror::Error;

use crate::care::HospitalEntry;
use crate::config::{LookupConfig, MAX_HOSPITALS};

/// Why a remote lookup stage produced nothing usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Lookup service unreachable: {0}")]
    Unavailable(String),

    #[error("Lookup timed out after {0}s")]
    Timeout(u64),

    #[error("Lookup service returned error (status {status})")]
    Status { status: u16 },

    #[error("Malformed lookup response: {0}")]
    Malformed(String),

    #[error("No results for '{0}'")]
    NoResults(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl LookupError {
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            LookupError::Timeout(timeout_secs)
        } else if e.is_connect() {
            LookupError::Unavailable(e.to_string())
        } else if e.is_decode() {
            LookupError::Malformed(e.to_string())
        } else {
            LookupError::HttpClient(e.to_string())
        }
    }
}

/// One link in the lookup chain.
///
/// `None` or an empty list both mean "try the next source".
pub trait HospitalSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn find(&self, locality: &str) -> Option<Vec<HospitalEntry>>;
}

/// Ordered chain of hospital sources.
pub struct HospitalLocator {
    sources: Vec<Box<dyn HospitalSource>>,
    max_results: usize,
}

impl HospitalLocator {
    pub fn new(sources: Vec<Box<dyn HospitalSource>>) -> Self {
        Self {
            sources,
            max_results: MAX_HOSPITALS,
        }
    }

    /// Nominatim + Overpass, then the fallback table.
    pub fn standard(
        config: &LookupConfig,
        fallback: Arc<FallbackHospitalTable>,
    ) -> Result<Self, LookupError> {
        let remote = RemoteHospitalSource::new(
            NominatimGeocoder::new(config)?,
            OverpassClient::new(config)?,
            config.radius_m,
            config.max_results,
            config.unnamed_policy,
        );
        Ok(Self::new(vec![Box::new(remote)])
            .with_fallback(fallback)
            .with_max_results(config.max_results))
    }

    /// Fallback table only; never touches the network.
    pub fn offline(fallback: Arc<FallbackHospitalTable>) -> Self {
        Self::new(Vec::new()).with_fallback(fallback)
    }

    pub fn with_fallback(mut self, table: Arc<FallbackHospitalTable>) -> Self {
        self.sources.push(Box::new(FallbackHospitalSource::new(table)));
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Walk the chain; the first non-empty answer wins. Empty when every
    /// source comes up empty.
    pub fn find_hospitals(&self, locality: &str) -> Vec<HospitalEntry> {
        let _span = tracing::info_span!("find_hospitals", locality).entered();

        for source in &self.sources {
            match source.find(locality) {
                Some(mut found) if !found.is_empty() => {
                    found.truncate(self.max_results);
                    tracing::info!(source = source.name(), count = found.len(), "Hospitals found");
                    return found;
                }
                _ => tracing::debug!(source = source.name(), "No hospitals from source"),
            }
        }

        tracing::info!("No hospitals found for locality");
        Vec::new()
    }
}
