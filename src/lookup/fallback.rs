use std::collections::HashMap;
use std::sync::Arc;

use super::HospitalSource;
use crate::care::{map_link, HospitalEntry};

/// Most entries stored per locality.
pub const MAX_FALLBACK_PER_LOCALITY: usize = 5;

/// Case-normalize a locality: trim, collapse inner whitespace, title-case
/// each word ("  new   DELHI " → "New Delhi", "navi-mumbai" → "Navi-Mumbai").
pub fn normalize_locality(locality: &str) -> String {
    let collapsed = locality.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut prev_alpha = false;
    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Static locality → hospitals table consulted when live lookups fail.
#[derive(Debug, Clone, Default)]
pub struct FallbackHospitalTable {
    entries: HashMap<String, Vec<String>>,
}

impl FallbackHospitalTable {
    /// Keys are normalized; each list is capped at
    /// [`MAX_FALLBACK_PER_LOCALITY`].
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(locality, mut hospitals)| {
                hospitals.truncate(MAX_FALLBACK_PER_LOCALITY);
                (normalize_locality(locality.as_ref()), hospitals)
            })
            .collect();
        Self { entries }
    }

    /// Major Indian cities.
    pub fn standard() -> Self {
        const CITIES: &[(&str, &[&str])] = &[
            ("Chennai", &["Apollo Hospitals", "Fortis Malar Hospital", "MIOT International"]),
            (
                "Mumbai",
                &["Lilavati Hospital", "Kokilaben Dhirubhai Ambani Hospital", "Breach Candy Hospital"],
            ),
            ("Delhi", &["AIIMS Delhi", "Sir Ganga Ram Hospital", "Max Super Speciality Hospital"]),
            (
                "New Delhi",
                &["AIIMS Delhi", "Sir Ganga Ram Hospital", "Indraprastha Apollo Hospital"],
            ),
            ("Bangalore", &["Manipal Hospital", "Narayana Health City", "Fortis Hospital Bannerghatta"]),
            ("Bengaluru", &["Manipal Hospital", "Narayana Health City", "Fortis Hospital Bannerghatta"]),
            ("Hyderabad", &["Yashoda Hospitals", "KIMS Hospitals", "Apollo Hospitals Jubilee Hills"]),
            ("Kolkata", &["AMRI Hospitals", "Apollo Gleneagles Hospital", "Peerless Hospital"]),
            ("Pune", &["Ruby Hall Clinic", "Jehangir Hospital", "Sahyadri Hospital"]),
        ];

        Self::new(CITIES.iter().map(|(city, hospitals)| {
            (*city, hospitals.iter().map(|h| h.to_string()).collect())
        }))
    }

    pub fn get(&self, locality: &str) -> Option<&[String]> {
        self.entries
            .get(&normalize_locality(locality))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Chain link backed by the static table.
pub struct FallbackHospitalSource {
    table: Arc<FallbackHospitalTable>,
}

impl FallbackHospitalSource {
    pub fn new(table: Arc<FallbackHospitalTable>) -> Self {
        Self { table }
    }
}

impl HospitalSource for FallbackHospitalSource {
    fn name(&self) -> &'static str {
        "fallback_table"
    }

    fn find(&self, locality: &str) -> Option<Vec<HospitalEntry>> {
        let hospitals = self.table.get(locality)?;
        Some(
            hospitals
                .iter()
                .map(|name| HospitalEntry {
                    name: name.clone(),
                    map_link: map_link(name, locality),
                })
                .collect(),
        )
    }
}
