use reqwest::Url;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// Google Maps search deep link for a hospital within a locality.
///
/// Query is form-urlencoded, so spaces become `+`:
/// `("Apollo Hospitals", "Chennai")` →
/// `https://www.google.com/maps/search/?api=1&query=Apollo+Hospitals+Chennai`.
pub fn map_link(hospital: &str, locality: &str) -> Option<String> {
    let query = format!("{} {}", hospital.trim(), locality.trim());
    Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", query.trim())])
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_search_link() {
        assert_eq!(
            map_link("Apollo Hospitals", "Chennai").unwrap(),
            "https://www.google.com/maps/search/?api=1&query=Apollo+Hospitals+Chennai"
        );
    }

    #[test]
    fn escapes_reserved_characters() {
        let link = map_link("St. John's & Co", "Bengaluru").unwrap();
        assert!(link.contains("St.+John%27s+%26+Co+Bengaluru"), "{link}");
    }

    #[test]
    fn empty_locality_does_not_leave_trailing_plus() {
        let link = map_link("AIIMS", "").unwrap();
        assert!(link.ends_with("query=AIIMS"), "{link}");
    }
}
