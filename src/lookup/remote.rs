use serde::{Deserialize, Serialize};

use super::{Geocoder, HospitalSource, PoiClient, PoiNode};
use crate::care::{map_link, HospitalEntry};

/// Label used for POI nodes without a name under [`UnnamedPoiPolicy::Placeholder`].
pub const UNNAMED_PLACEHOLDER: &str = "N/A";

/// What to do with hospital nodes that carry no `name` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnnamedPoiPolicy {
    /// Drop them.
    #[default]
    Skip,
    /// Keep them as `"N/A"` entries without a map link.
    Placeholder,
}

/// Geocode the locality, then search for hospitals around it.
///
/// The POI stage only runs once geocoding succeeded. No retries: any failure
/// ends this source and the locator moves on.
pub struct RemoteHospitalSource<G, P> {
    geocoder: G,
    poi: P,
    radius_m: u32,
    max_results: usize,
    unnamed_policy: UnnamedPoiPolicy,
}

impl<G: Geocoder, P: PoiClient> RemoteHospitalSource<G, P> {
    pub fn new(
        geocoder: G,
        poi: P,
        radius_m: u32,
        max_results: usize,
        unnamed_policy: UnnamedPoiPolicy,
    ) -> Self {
        Self {
            geocoder,
            poi,
            radius_m,
            max_results,
            unnamed_policy,
        }
    }

    fn to_entries(&self, nodes: Vec<PoiNode>, locality: &str) -> Vec<HospitalEntry> {
        nodes
            .into_iter()
            .filter_map(|node| match (node.name, self.unnamed_policy) {
                (Some(name), _) => Some(HospitalEntry {
                    map_link: map_link(&name, locality),
                    name,
                }),
                (None, UnnamedPoiPolicy::Placeholder) => Some(HospitalEntry {
                    name: UNNAMED_PLACEHOLDER.to_string(),
                    map_link: None,
                }),
                (None, UnnamedPoiPolicy::Skip) => None,
            })
            .take(self.max_results)
            .collect()
    }
}

impl<G: Geocoder, P: PoiClient> HospitalSource for RemoteHospitalSource<G, P> {
    fn name(&self) -> &'static str {
        "remote_osm"
    }

    fn find(&self, locality: &str) -> Option<Vec<HospitalEntry>> {
        let at = match self.geocoder.geocode(locality) {
            Ok(at) => at,
            Err(e) => {
                tracing::warn!(error = %e, "Geocoding failed, skipping POI search");
                return None;
            }
        };

        let nodes = match self.poi.nearby_hospitals(at, self.radius_m) {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!(error = %e, lat = at.lat, lon = at.lon, "POI search failed");
                return None;
            }
        };

        let total = nodes.len();
        let entries = self.to_entries(nodes, locality);
        tracing::debug!(total, kept = entries.len(), "POI nodes collected");

        if entries.is_empty() {
            None
        } else {
            Some(entries)
        }
    }
}
