use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::LookupError;
use crate::config::LookupConfig;

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Free-text place name → coordinate.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<Coordinate, LookupError>;
}

impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    fn geocode(&self, query: &str) -> Result<Coordinate, LookupError> {
        (**self).geocode(query)
    }
}

/// OpenStreetMap Nominatim search client.
pub struct NominatimGeocoder {
    url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl NominatimGeocoder {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.geocode_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LookupError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: config.geocode_url.clone(),
            client,
            timeout_secs: config.geocode_timeout.as_secs(),
        })
    }
}

/// One Nominatim search hit. Coordinates arrive as decimal strings.
#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &str) -> Result<Coordinate, LookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .map_err(|e| LookupError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        first_coordinate(query, &places)
    }
}

fn first_coordinate(query: &str, places: &[NominatimPlace]) -> Result<Coordinate, LookupError> {
    let first = places
        .first()
        .ok_or_else(|| LookupError::NoResults(query.to_string()))?;

    let lat = parse_degrees(&first.lat, 90.0)?;
    let lon = parse_degrees(&first.lon, 180.0)?;
    Ok(Coordinate { lat, lon })
}

fn parse_degrees(raw: &str, bound: f64) -> Result<f64, LookupError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| LookupError::Malformed(format!("bad coordinate '{raw}'")))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(LookupError::Malformed(format!("coordinate out of range '{raw}'")));
    }
    Ok(value)
}

/// Scripted geocoder for tests that counts calls.
pub struct MockGeocoder {
    result: Result<Coordinate, LookupError>,
    calls: AtomicUsize,
}

impl MockGeocoder {
    pub fn found(at: Coordinate) -> Self {
        Self {
            result: Ok(at),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::with_error(LookupError::Unavailable("mock geocoder down".into()))
    }

    pub fn with_error(error: LookupError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, _query: &str) -> Result<Coordinate, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
