//! Data types for boundary-lookup responses.

use serde::{Deserialize, Serialize};

/// One electoral boundary containing the queried point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Boundary {
    /// Boundary-set label (e.g., "Federal electoral districts")
    pub boundary_set_name: String,
    /// District name within the set
    pub name: String,
}

/// Response from the postal-code endpoint.
///
/// The service returns boundaries under two keys depending on whether the
/// code was matched by centroid or by concordance data; either may be
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostalCodeResponse {
    #[serde(default)]
    pub boundaries_centroid: Vec<Boundary>,
    #[serde(default)]
    pub boundaries_concordance: Vec<Boundary>,
}

impl PostalCodeResponse {
    /// Name of the first federal electoral district in the response.
    ///
    /// Scans the centroid list, then the concordance list, for the first
    /// boundary whose set name contains "federal" (case-insensitive).
    #[must_use]
    pub fn federal_district(&self) -> Option<&str> {
        self.boundaries_centroid
            .iter()
            .chain(&self.boundaries_concordance)
            .find(|b| b.boundary_set_name.to_lowercase().contains("federal"))
            .map(|b| b.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(set: &str, name: &str) -> Boundary {
        Boundary {
            boundary_set_name: set.into(),
            name: name.into(),
        }
    }

    #[test]
    fn picks_first_federal_boundary_from_centroid_list() {
        let response = PostalCodeResponse {
            boundaries_centroid: vec![
                boundary("Ontario electoral districts", "Ottawa Centre (provincial)"),
                boundary("Federal electoral districts", "Ottawa Centre"),
            ],
            boundaries_concordance: vec![boundary("Federal electoral districts", "Ottawa South")],
        };
        assert_eq!(response.federal_district(), Some("Ottawa Centre"));
    }

    #[test]
    fn falls_back_to_concordance_list() {
        let response = PostalCodeResponse {
            boundaries_centroid: vec![boundary("Municipal wards", "Somerset")],
            boundaries_concordance: vec![boundary("FEDERAL Electoral Districts", "Ottawa South")],
        };
        assert_eq!(response.federal_district(), Some("Ottawa South"));
    }

    #[test]
    fn no_federal_boundary_yields_none() {
        let response = PostalCodeResponse {
            boundaries_centroid: vec![boundary("Municipal wards", "Somerset")],
            boundaries_concordance: vec![],
        };
        assert_eq!(response.federal_district(), None);
    }

    #[test]
    fn missing_keys_deserialize_to_empty_lists() {
        let response: PostalCodeResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(response.boundaries_centroid.is_empty());
        assert!(response.boundaries_concordance.is_empty());
        assert_eq!(response.federal_district(), None);
    }
}
