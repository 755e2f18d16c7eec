//! Airport lookup records
//!
//! The `searchAirport` endpoint returns candidate places for a query. The
//! search needs one airport per side: an exact `skyId` match when the user
//! typed a code, otherwise whatever the upstream ranked first.

use serde::{Deserialize, Serialize};

/// Airport information from the lookup endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub sky_id: String,
    pub presentation: Presentation,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_name: Option<String>,
}

impl Airport {
    /// `"<title> (<skyId>)"`, as shown on a flight offer
    pub fn label(&self) -> String {
        format!("{} ({})", self.presentation.title, self.sky_id)
    }
}

/// Envelope of `searchAirport`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirportLookupResponse {
    pub status: Option<bool>,
    /// Candidates missing a code, title or entity id are skipped.
    #[serde(deserialize_with = "crate::raw::lenient_list")]
    pub data: Option<Vec<Airport>>,
}

impl AirportLookupResponse {
    pub fn into_candidates(self) -> Vec<Airport> {
        self.data.unwrap_or_default()
    }
}

/// Pick the candidate whose `skyId` equals the query (case-insensitive),
/// falling back to the first candidate.
pub fn select_airport(candidates: Vec<Airport>, query: &str) -> Option<Airport> {
    let query = query.trim();
    let exact = candidates
        .iter()
        .position(|airport| airport.sky_id.eq_ignore_ascii_case(query));

    let mut candidates = candidates;
    match exact {
        Some(index) => Some(candidates.swap_remove(index)),
        None => candidates.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn airport(sky_id: &str, title: &str) -> Airport {
        Airport {
            sky_id: sky_id.to_string(),
            presentation: Presentation {
                title: title.to_string(),
                suggestion_title: None,
                subtitle: None,
            },
            navigation: Navigation {
                entity_id: format!("id-{}", sky_id),
                entity_type: Some("AIRPORT".to_string()),
                localized_name: None,
            },
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let candidates = vec![airport("NYCA", "New York"), airport("JFK", "New York John F. Kennedy")];
        let selected = select_airport(candidates, "jfk").unwrap();
        assert_eq!(selected.sky_id, "JFK");
        assert_eq!(selected.label(), "New York John F. Kennedy (JFK)");
    }

    #[test]
    fn test_falls_back_to_first_candidate() {
        let candidates = vec![airport("LOND", "London"), airport("LHR", "London Heathrow")];
        assert_eq!(select_airport(candidates, "LON").unwrap().sky_id, "LOND");
        assert_eq!(select_airport(Vec::new(), "LON"), None);
    }

    #[test]
    fn test_parse_lookup_response() {
        let response: AirportLookupResponse = serde_json::from_value(json!({
            "status": true,
            "timestamp": 1729000000000u64,
            "data": [{
                "skyId": "JFK",
                "entityId": "95565058",
                "presentation": {
                    "title": "New York John F. Kennedy",
                    "suggestionTitle": "New York John F. Kennedy (JFK)",
                    "subtitle": "United States"
                },
                "navigation": {
                    "entityId": "95565058",
                    "entityType": "AIRPORT",
                    "localizedName": "New York John F. Kennedy"
                }
            }]
        }))
        .unwrap();

        let candidates = response.into_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].navigation.entity_id, "95565058");
        assert_eq!(candidates[0].presentation.subtitle.as_deref(), Some("United States"));
    }

    #[test]
    fn test_odd_candidates_are_skipped() {
        let response: AirportLookupResponse = serde_json::from_value(json!({
            "status": true,
            "data": [
                {"skyId": "NYCA", "presentation": {"title": null}, "navigation": {"entityId": 27537542}},
                "garbage",
                {
                    "skyId": "JFK",
                    "presentation": {"title": "New York John F. Kennedy"},
                    "navigation": {"entityId": "95565058"}
                }
            ]
        }))
        .unwrap();

        let candidates = response.into_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(select_airport(candidates, "NYC").unwrap().sky_id, "JFK");

        let response: AirportLookupResponse =
            serde_json::from_value(json!({"status": true, "data": {"skyId": "JFK"}})).unwrap();
        assert!(response.into_candidates().is_empty());
    }

    #[test]
    fn test_missing_data_is_empty() {
        let response: AirportLookupResponse =
            serde_json::from_value(json!({"status": false, "message": "quota"})).unwrap();
        assert!(response.into_candidates().is_empty());
    }
}
