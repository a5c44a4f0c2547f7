use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Map center used when a search produced no locations at all (Bengaluru).
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 12.9716,
    lon: 77.5946,
};

/// Queries shorter than this (in characters) never reach the autocomplete endpoint.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

impl SuggestionItem {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl LocationResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub results: Vec<SuggestionItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub good: Vec<LocationResult>,
    #[serde(default)]
    pub danger: Vec<LocationResult>,
    /// Set by the backend instead of the lists when the place cannot be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseChoiceError {
    #[error("unknown infrastructure category `{0}`")]
    Infra(String),
    #[error("unsupported search radius `{0}`")]
    Radius(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraCategory {
    #[default]
    Hospital,
    School,
    Park,
    Clinic,
    Pharmacy,
}

impl InfraCategory {
    pub const ALL: [InfraCategory; 5] = [
        InfraCategory::Hospital,
        InfraCategory::School,
        InfraCategory::Park,
        InfraCategory::Clinic,
        InfraCategory::Pharmacy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InfraCategory::Hospital => "hospital",
            InfraCategory::School => "school",
            InfraCategory::Park => "park",
            InfraCategory::Clinic => "clinic",
            InfraCategory::Pharmacy => "pharmacy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InfraCategory::Hospital => "Hospital",
            InfraCategory::School => "School",
            InfraCategory::Park => "Park",
            InfraCategory::Clinic => "Clinic",
            InfraCategory::Pharmacy => "Pharmacy",
        }
    }
}

impl fmt::Display for InfraCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfraCategory {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|infra| infra.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseChoiceError::Infra(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SearchRadius {
    #[default]
    Km2,
    Km4,
    Km6,
    Km8,
    Km10,
}

impl SearchRadius {
    pub const ALL: [SearchRadius; 5] = [
        SearchRadius::Km2,
        SearchRadius::Km4,
        SearchRadius::Km6,
        SearchRadius::Km8,
        SearchRadius::Km10,
    ];

    pub fn meters(self) -> u32 {
        match self {
            SearchRadius::Km2 => 2000,
            SearchRadius::Km4 => 4000,
            SearchRadius::Km6 => 6000,
            SearchRadius::Km8 => 8000,
            SearchRadius::Km10 => 10000,
        }
    }

    pub fn label(self) -> String {
        format!("{} km", self.meters() / 1000)
    }
}

impl From<SearchRadius> for u32 {
    fn from(radius: SearchRadius) -> Self {
        radius.meters()
    }
}

impl TryFrom<u32> for SearchRadius {
    type Error = ParseChoiceError;

    fn try_from(meters: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|radius| radius.meters() == meters)
            .ok_or_else(|| ParseChoiceError::Radius(meters.to_string()))
    }
}

impl FromStr for SearchRadius {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| ParseChoiceError::Radius(s.to_string()))
            .and_then(SearchRadius::try_from)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendParams {
    pub place: String,
    pub infra: InfraCategory,
    pub radius: SearchRadius,
    pub coordinate: Option<Coordinate>,
}

impl RecommendParams {
    pub fn url(&self, base: &str) -> Result<Url, url::ParseError> {
        let mut url = endpoint(base, "recommend")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("place", &self.place)
                .append_pair("infra", self.infra.as_str())
                .append_pair("radius", &self.radius.meters().to_string());
            if let Some(coord) = self.coordinate {
                query
                    .append_pair("lat", &coord.lat.to_string())
                    .append_pair("lon", &coord.lon.to_string());
            }
        }
        Ok(url)
    }
}

pub fn autocomplete_url(base: &str, query: &str) -> Result<Url, url::ParseError> {
    let mut url = endpoint(base, "autocomplete")?;
    url.query_pairs_mut().append_pair("q", query);
    Ok(url)
}

fn endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}/{path}", base.trim_end_matches('/')))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Good,
    Danger,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Good => "good",
            Classification::Danger => "danger",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Classification::Good => "Recommended Location",
            Classification::Danger => "Danger Location",
        }
    }

    pub fn marker_color(self) -> &'static str {
        match self {
            Classification::Good => "blue",
            Classification::Danger => "red",
        }
    }
}

/// First recommended entry, else first danger entry, else [`DEFAULT_CENTER`].
pub fn map_center(best: &[LocationResult], danger: &[LocationResult]) -> Coordinate {
    best.first()
        .or_else(|| danger.first())
        .map(LocationResult::coordinate)
        .unwrap_or(DEFAULT_CENTER)
}

pub fn reason_bullets(reason: &str) -> Vec<&str> {
    reason
        .split(". ")
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

pub fn external_map_link(coord: Coordinate) -> String {
    format!("https://www.google.com/maps?q={},{}", coord.lat, coord.lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn result_at(lat: f64, lon: f64) -> LocationResult {
        LocationResult {
            lat,
            lon,
            reason: String::new(),
            score: None,
            rank: None,
        }
    }

    #[test]
    fn center_falls_back_to_default_without_results() {
        assert_eq!(map_center(&[], &[]), DEFAULT_CENTER);
        assert_eq!(DEFAULT_CENTER.lat, 12.9716);
        assert_eq!(DEFAULT_CENTER.lon, 77.5946);
    }

    #[test]
    fn center_prefers_first_good_entry() {
        let best = vec![result_at(12.93, 77.62), result_at(12.94, 77.63)];
        let danger = vec![result_at(13.0, 77.5)];
        assert_eq!(
            map_center(&best, &danger),
            Coordinate {
                lat: 12.93,
                lon: 77.62
            }
        );
    }

    #[test]
    fn center_uses_danger_when_no_good_entry() {
        let danger = vec![result_at(13.0, 77.5), result_at(13.1, 77.4)];
        assert_eq!(map_center(&[], &danger), Coordinate { lat: 13.0, lon: 77.5 });
    }

    #[test]
    fn reason_splits_into_sentence_bullets() {
        let bullets = reason_bullets("Near hospital. Low flood risk. Good transit.");
        assert_eq!(bullets, vec!["Near hospital", "Low flood risk", "Good transit."]);
    }

    #[test]
    fn reason_drops_empty_fragments() {
        assert!(reason_bullets("").is_empty());
        assert_eq!(reason_bullets(". A. . B"), vec!["A", "B"]);
    }

    #[test]
    fn map_link_points_at_coordinate() {
        let link = external_map_link(Coordinate {
            lat: 12.9352,
            lon: 77.6245,
        });
        assert_eq!(link, "https://www.google.com/maps?q=12.9352,77.6245");
    }

    #[test]
    fn autocomplete_url_encodes_query() {
        let url = autocomplete_url("http://127.0.0.1:5000/", "MG Road & Co").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/autocomplete?q=MG+Road+%26+Co"
        );
    }

    #[test]
    fn recommend_url_includes_coordinate_when_resolved() {
        let params = RecommendParams {
            place: "Koramangala, Bengaluru".into(),
            infra: InfraCategory::School,
            radius: SearchRadius::Km6,
            coordinate: Some(Coordinate {
                lat: 12.9352,
                lon: 77.6245,
            }),
        };
        let url = params.url("http://127.0.0.1:5000").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.path(), "/recommend");
        assert_eq!(
            pairs,
            vec![
                ("place".into(), "Koramangala, Bengaluru".into()),
                ("infra".into(), "school".into()),
                ("radius".into(), "6000".into()),
                ("lat".into(), "12.9352".into()),
                ("lon".into(), "77.6245".into()),
            ]
        );
    }

    #[test]
    fn recommend_url_omits_missing_coordinate() {
        let params = RecommendParams {
            place: "Indiranagar".into(),
            infra: InfraCategory::Park,
            radius: SearchRadius::Km2,
            coordinate: None,
        };
        let url = params.url("http://localhost:5000").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/recommend?place=Indiranagar&infra=park&radius=2000"
        );
    }

    #[test]
    fn responses_default_missing_lists() {
        let autocomplete: AutocompleteResponse = serde_json::from_str("{}").unwrap();
        assert!(autocomplete.results.is_empty());

        let recommend: RecommendResponse =
            serde_json::from_str(r#"{"good":[{"lat":1.0,"lon":2.0,"reason":"x"}]}"#).unwrap();
        assert_eq!(recommend.good.len(), 1);
        assert!(recommend.danger.is_empty());
        assert!(recommend.error.is_none());
    }

    #[test]
    fn location_result_ignores_backend_metrics() {
        let json = r#"{
            "lat": 12.97, "lon": 77.59, "reason": "Rank 1. Safe",
            "score": 81.5, "rank": 1, "aqi": 2, "raw_scores": {"accessibility": 0.4}
        }"#;
        let result: LocationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.score, Some(81.5));
        assert_eq!(result.rank, Some(1));
        assert_eq!(result.reason, "Rank 1. Safe");
    }

    #[test]
    fn rejection_message_is_kept() {
        let recommend: RecommendResponse =
            serde_json::from_str(r#"{"error":"Place not found"}"#).unwrap();
        assert_eq!(recommend.error.as_deref(), Some("Place not found"));
        assert!(recommend.good.is_empty());
    }

    #[test]
    fn infra_round_trips_through_text() {
        for infra in InfraCategory::ALL {
            assert_eq!(infra.as_str().parse::<InfraCategory>(), Ok(infra));
        }
        assert_eq!("Pharmacy".parse::<InfraCategory>(), Ok(InfraCategory::Pharmacy));
        assert!(matches!(
            "airport".parse::<InfraCategory>(),
            Err(ParseChoiceError::Infra(_))
        ));
        assert_eq!(
            serde_json::to_string(&InfraCategory::Clinic).unwrap(),
            "\"clinic\""
        );
    }

    #[test]
    fn radius_only_accepts_offered_values() {
        let meters: Vec<u32> = SearchRadius::ALL.iter().map(|r| r.meters()).collect();
        assert_eq!(meters, vec![2000, 4000, 6000, 8000, 10000]);
        assert_eq!("8000".parse::<SearchRadius>(), Ok(SearchRadius::Km8));
        assert_eq!(SearchRadius::Km10.label(), "10 km");
        assert!(SearchRadius::try_from(2500).is_err());
        assert!("two".parse::<SearchRadius>().is_err());
        assert_eq!(serde_json::to_string(&SearchRadius::Km4).unwrap(), "4000");
        assert!(serde_json::from_str::<SearchRadius>("3000").is_err());
    }

    #[test]
    fn classification_styles() {
        assert_eq!(Classification::Good.marker_color(), "blue");
        assert_eq!(Classification::Danger.marker_color(), "red");
        assert_eq!(Classification::Danger.title(), "Danger Location");
        assert_eq!(
            serde_json::to_string(&Classification::Good).unwrap(),
            format!("\"{}\"", Classification::Good.as_str())
        );
    }

    proptest! {
        #[test]
        fn bullets_preserve_sentence_order(
            fragments in proptest::collection::vec("[A-Za-z][A-Za-z ]{0,20}", 0..8)
        ) {
            let reason = fragments.join(". ");
            let bullets = reason_bullets(&reason);
            prop_assert_eq!(bullets, fragments.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn good_entry_always_wins_center(
            good_lat in -90.0f64..90.0,
            good_lon in -180.0f64..180.0,
            danger in proptest::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 0..5)
        ) {
            let best = vec![result_at(good_lat, good_lon)];
            let danger: Vec<_> = danger.into_iter().map(|(lat, lon)| result_at(lat, lon)).collect();
            prop_assert_eq!(map_center(&best, &danger), Coordinate { lat: good_lat, lon: good_lon });
        }
    }
}
