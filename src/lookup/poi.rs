use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use super::{Coordinate, LookupError};
use crate::config::LookupConfig;

/// A tagged map node returned by the POI service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoiNode {
    pub name: Option<String>,
}

impl PoiNode {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }

    pub fn unnamed() -> Self {
        Self::default()
    }
}

/// Radius search for hospitals and clinics around a coordinate.
pub trait PoiClient: Send + Sync {
    fn nearby_hospitals(&self, at: Coordinate, radius_m: u32) -> Result<Vec<PoiNode>, LookupError>;
}

impl<T: PoiClient + ?Sized> PoiClient for Arc<T> {
    fn nearby_hospitals(&self, at: Coordinate, radius_m: u32) -> Result<Vec<PoiNode>, LookupError> {
        (**self).nearby_hospitals(at, radius_m)
    }
}

/// Overpass QL for hospital and clinic nodes within `radius_m` of `at`.
/// `timeout_secs` bounds the query on the server side.
pub fn overpass_query(at: Coordinate, radius_m: u32, timeout_secs: u64) -> String {
    let around = format!("around:{radius_m},{},{}", at.lat, at.lon);
    format!(
        "[out:json][timeout:{timeout_secs}];\n\
         (\n  node[\"amenity\"=\"hospital\"]({around});\n  node[\"amenity\"=\"clinic\"]({around});\n);\n\
         out body;"
    )
}

/// OpenStreetMap Overpass API client.
pub struct OverpassClient {
    url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.poi_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LookupError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: config.poi_url.clone(),
            client,
            timeout_secs: config.poi_timeout.as_secs().max(1),
        })
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl From<OverpassElement> for PoiNode {
    fn from(mut element: OverpassElement) -> Self {
        PoiNode {
            name: element
                .tags
                .remove("name")
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        }
    }
}

impl PoiClient for OverpassClient {
    fn nearby_hospitals(&self, at: Coordinate, radius_m: u32) -> Result<Vec<PoiNode>, LookupError> {
        let query = overpass_query(at, radius_m, self.timeout_secs);

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .map_err(|e| LookupError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: OverpassResponse = response
            .json()
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        Ok(parsed.elements.into_iter().map(PoiNode::from).collect())
    }
}

/// Scripted POI client for tests that counts calls.
pub struct MockPoiClient {
    result: Result<Vec<PoiNode>, LookupError>,
    calls: AtomicUsize,
}

impl MockPoiClient {
    pub fn new(nodes: Vec<PoiNode>) -> Self {
        Self {
            result: Ok(nodes),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn named(names: &[&str]) -> Self {
        Self::new(names.iter().map(|n| PoiNode::named(n)).collect())
    }

    pub fn failing() -> Self {
        Self {
            result: Err(LookupError::Unavailable("mock POI service down".into())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PoiClient for MockPoiClient {
    fn nearby_hospitals(&self, _at: Coordinate, _radius_m: u32) -> Result<Vec<PoiNode>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Form, Json, Router};

    use super::*;
    use crate::lookup::stub_server::StubServer;

    const CHENNAI: Coordinate = Coordinate { lat: 13.0827, lon: 80.2707 };

    #[test]
    fn query_covers_hospitals_and_clinics_within_radius() {
        let q = overpass_query(CHENNAI, 20_000, 25);
        assert!(q.starts_with("[out:json][timeout:25];"));
        assert!(q.contains("node[\"amenity\"=\"hospital\"](around:20000,13.0827,80.2707);"));
        assert!(q.contains("node[\"amenity\"=\"clinic\"](around:20000,13.0827,80.2707);"));
        assert!(q.ends_with("out body;"));
    }

    #[test]
    fn element_without_name_tag_maps_to_unnamed() {
        let element: OverpassElement =
            serde_json::from_value(serde_json::json!({ "tags": { "amenity": "clinic" } })).unwrap();
        assert_eq!(PoiNode::from(element), PoiNode::unnamed());

        let element: OverpassElement = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(PoiNode::from(element), PoiNode::unnamed());
    }

    #[test]
    fn blank_name_treated_as_missing() {
        let element: OverpassElement =
            serde_json::from_value(serde_json::json!({ "tags": { "name": "  " } })).unwrap();
        assert_eq!(PoiNode::from(element).name, None);
    }

    #[test]
    fn overpass_posts_query_and_parses_elements() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let seen_by_handler = seen.clone();
        let router = Router::new().route(
            "/api/interpreter",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let seen = seen_by_handler.clone();
                async move {
                    seen.lock().unwrap().push(form.get("data").cloned().unwrap_or_default());
                    Json(serde_json::json!({
                        "version": 0.6,
                        "elements": [
                            { "type": "node", "id": 1, "lat": 13.06, "lon": 80.25,
                              "tags": { "amenity": "hospital", "name": "Apollo Hospitals" } },
                            { "type": "node", "id": 2, "lat": 13.07, "lon": 80.26,
                              "tags": { "amenity": "clinic" } }
                        ]
                    }))
                }
            }),
        );
        let server = StubServer::spawn(router);

        let client = OverpassClient::new(&LookupConfig::with_base_url(&server.base_url)).unwrap();
        let nodes = client.nearby_hospitals(CHENNAI, 20_000).unwrap();

        assert_eq!(nodes, vec![PoiNode::named("Apollo Hospitals"), PoiNode::unnamed()]);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("around:20000,13.0827,80.2707"));
    }

    #[test]
    fn overpass_gateway_timeout_surfaces_status() {
        let router = Router::new().route(
            "/api/interpreter",
            post(|| async { axum::http::StatusCode::GATEWAY_TIMEOUT }),
        );
        let server = StubServer::spawn(router);

        let client = OverpassClient::new(&LookupConfig::with_base_url(&server.base_url)).unwrap();
        let err = client.nearby_hospitals(CHENNAI, 20_000).unwrap_err();
        assert_eq!(err, LookupError::Status { status: 504 });
    }

    #[test]
    fn overpass_sends_user_agent_and_server_timeout() {
        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let seen_by_handler = seen.clone();
        let router = Router::new().route(
            "/api/interpreter",
            post(move |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| {
                let seen = seen_by_handler.clone();
                async move {
                    let agent = headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let data = form.get("data").cloned().unwrap_or_default();
                    seen.lock().unwrap().push((data, agent));
                    Json(serde_json::json!({ "elements": [] }))
                }
            }),
        );
        let server = StubServer::spawn(router);

        let config = LookupConfig {
            poi_timeout: Duration::from_secs(7),
            ..LookupConfig::with_base_url(&server.base_url)
        };
        let client = OverpassClient::new(&config).unwrap();
        assert!(client.nearby_hospitals(CHENNAI, 5_000).unwrap().is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.starts_with("[out:json][timeout:7];"), "{}", seen[0].0);
        assert!(seen[0].1.starts_with("chestcare/"));
    }

    #[test]
    fn overpass_non_json_is_malformed() {
        let router = Router::new().route(
            "/api/interpreter",
            post(|| async { "<html>rate limited</html>" }),
        );
        let server = StubServer::spawn(router);

        let client = OverpassClient::new(&LookupConfig::with_base_url(&server.base_url)).unwrap();
        let err = client.nearby_hospitals(CHENNAI, 20_000).unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)), "{err:?}");
    }

    #[test]
    fn overpass_hung_upstream_times_out() {
        let router = Router::new().route(
            "/api/interpreter",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(serde_json::json!({ "elements": [] }))
            }),
        );
        let server = StubServer::spawn(router);

        let config = LookupConfig {
            poi_timeout: Duration::from_millis(200),
            ..LookupConfig::with_base_url(&server.base_url)
        };
        let client = OverpassClient::new(&config).unwrap();
        let err = client.nearby_hospitals(CHENNAI, 20_000).unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)), "{err:?}");
    }

    #[test]
    fn mock_failing_counts_calls() {
        let poi = MockPoiClient::failing();
        assert!(poi.nearby_hospitals(CHENNAI, 1).is_err());
        assert_eq!(poi.calls(), 1);
    }
}
