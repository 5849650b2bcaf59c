use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CareError, CareTables, Label};
use crate::lookup::HospitalLocator;

/// A hospital suggestion, most relevant first within its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalEntry {
    pub name: String,
    pub map_link: Option<String>,
}

/// Everything shown to the user for one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecommendation {
    pub label: Label,
    pub confidence_percent: f64,
    pub specialist: String,
    pub explanation: String,
    pub hospitals: Vec<HospitalEntry>,
}

/// Stateless resolver: each call is independent, no caching, no retries.
pub struct CareResolver {
    tables: Arc<CareTables>,
    locator: HospitalLocator,
}

impl CareResolver {
    pub fn new(tables: Arc<CareTables>, locator: HospitalLocator) -> Self {
        Self { tables, locator }
    }

    /// Resolver without remote lookups, answering from the fallback table only.
    pub fn offline(tables: Arc<CareTables>) -> Self {
        let locator = HospitalLocator::offline(tables.fallback());
        Self::new(tables, locator)
    }

    /// Build the recommendation for a label.
    ///
    /// A blank or absent `locality` yields an empty hospital list without any
    /// lookup. May block on network I/O bounded by the lookup timeouts.
    pub fn resolve(
        &self,
        label: Label,
        confidence_percent: f64,
        locality: Option<&str>,
    ) -> CareRecommendation {
        if !(0.0..=100.0).contains(&confidence_percent) {
            tracing::warn!(confidence_percent, %label, "Confidence outside [0, 100]");
        }

        let hospitals = match locality.map(str::trim).filter(|l| !l.is_empty()) {
            Some(locality) => self.locator.find_hospitals(locality),
            None => Vec::new(),
        };

        tracing::debug!(%label, hospitals = hospitals.len(), "Care recommendation resolved");

        CareRecommendation {
            label,
            confidence_percent,
            specialist: self.tables.specialist(label).to_string(),
            explanation: self.tables.explanation(label).to_string(),
            hospitals,
        }
    }

    /// Like [`resolve`](Self::resolve) but for an unparsed classifier label.
    pub fn resolve_raw(
        &self,
        label: &str,
        confidence_percent: f64,
        locality: Option<&str>,
    ) -> Result<CareRecommendation, CareError> {
        let label: Label = label.parse()?;
        Ok(self.resolve(label, confidence_percent, locality))
    }
}
