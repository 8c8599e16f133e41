//! Filter predicates for event discovery.
//!
//! Each predicate answers one question about one event. [`ResolvedFilter`]
//! runs them in a fixed order and reports the first one that rejects, so an
//! excluded event always has exactly one [`Exclusion`] to blame.

use indulgeout_common::{lenient, read_coordinates, Event, GeoPoint};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Sentinel the UI sends for "no category / no city restriction".
pub const ALL: &str = "all";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Price buckets offered by the discovery page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum PriceRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "under_1000")]
    Under1000,
    #[serde(rename = "under_2000")]
    Under2000,
    #[serde(rename = "above_2000")]
    Above2000,
}

impl PriceRange {
    /// Unknown bucket names degrade to `All`.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "free" => Self::Free,
            "under_1000" => Self::Under1000,
            "under_2000" => Self::Under2000,
            "above_2000" => Self::Above2000,
            _ => Self::All,
        }
    }

    /// The single concrete bucket an amount falls into.
    pub fn bucket_of(amount: f64) -> Self {
        if amount <= 0.0 {
            Self::Free
        } else if amount < 1000.0 {
            Self::Under1000
        } else if amount < 2000.0 {
            Self::Under2000
        } else {
            Self::Above2000
        }
    }

    pub fn matches(self, amount: f64) -> bool {
        match self {
            Self::All => true,
            Self::Free => amount == 0.0,
            Self::Under1000 => amount > 0.0 && amount < 1000.0,
            Self::Under2000 => (1000.0..2000.0).contains(&amount),
            Self::Above2000 => amount >= 2000.0,
        }
    }
}

impl<'de> Deserialize<'de> for PriceRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Self::parse_lossy).unwrap_or_default())
    }
}

/// Filter, sort and page settings sent by the discovery page.
///
/// Every field is optional; an absent field never restricts. Values often
/// come straight from a query string, so numbers and flags are also read
/// from strings, and anything unreadable counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(deserialize_with = "lenient::deserialize_string")]
    pub search_term: Option<String>,
    #[serde(deserialize_with = "lenient::deserialize_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient::deserialize_string")]
    pub city: Option<String>,
    pub price_range: PriceRange,
    #[serde(deserialize_with = "lenient::deserialize_flag")]
    pub only_interested: bool,
    #[serde(deserialize_with = "lenient::deserialize_flag")]
    pub nearby: bool,
    #[serde(deserialize_with = "deserialize_user_location")]
    pub user_location: Option<GeoPoint>,
    #[serde(deserialize_with = "lenient::deserialize_number")]
    pub radius_km: Option<f64>,
    /// 1-indexed. Values below 1 are clamped.
    #[serde(deserialize_with = "lenient::deserialize_integer")]
    pub page: Option<i64>,
    /// Values below 1 are clamped.
    #[serde(deserialize_with = "lenient::deserialize_integer")]
    pub page_size: Option<i64>,
}

fn deserialize_user_location<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read_coordinates(&Value::deserialize(deserializer)?))
}

/// Why an event did not make it into the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Exclusion {
    Search,
    Category,
    City,
    Price,
    Interest,
    NoCoordinates,
    OutOfRange,
}

/// Per-reason drop counters for one selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionStats {
    pub search: usize,
    pub category: usize,
    pub city: usize,
    pub price: usize,
    pub interest: usize,
    pub no_coordinates: usize,
    pub out_of_range: usize,
}

impl ExclusionStats {
    pub fn record(&mut self, reason: Exclusion) {
        let slot = match reason {
            Exclusion::Search => &mut self.search,
            Exclusion::Category => &mut self.category,
            Exclusion::City => &mut self.city,
            Exclusion::Price => &mut self.price,
            Exclusion::Interest => &mut self.interest,
            Exclusion::NoCoordinates => &mut self.no_coordinates,
            Exclusion::OutOfRange => &mut self.out_of_range,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.search
            + self.category
            + self.city
            + self.price
            + self.interest
            + self.no_coordinates
            + self.out_of_range
    }
}

// ---------------------------------------------------------------------------
// Resolved filter
// ---------------------------------------------------------------------------

struct Proximity {
    origin: GeoPoint,
    radius_km: f64,
}

/// A [`FilterConfig`] with its defaults and sentinels worked out once,
/// ready to be applied to many events.
pub struct ResolvedFilter<'a> {
    search: Option<String>,
    category: Option<&'a str>,
    city: Option<&'a str>,
    price_range: PriceRange,
    interests: Option<&'a [String]>,
    proximity: Option<Proximity>,
}

impl<'a> ResolvedFilter<'a> {
    pub fn new(config: &'a FilterConfig, interests: &'a [String], default_radius_km: f64) -> Self {
        let search = config
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let interests = (config.only_interested && !interests.is_empty()).then_some(interests);

        let proximity = if config.nearby {
            match config.user_location.filter(GeoPoint::is_usable) {
                Some(origin) => Some(Proximity {
                    origin,
                    radius_km: resolve_radius(config.radius_km, default_radius_km),
                }),
                None => {
                    warn!(
                        user_location = ?config.user_location,
                        "Nearby filter requested without a usable user location, ignoring"
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            search,
            category: restriction(config.category.as_deref()),
            city: restriction(config.city.as_deref()),
            price_range: config.price_range,
            interests,
            proximity,
        }
    }

    /// First predicate that rejects `event`, or `None` if it survives.
    pub fn exclusion(&self, event: &Event) -> Option<Exclusion> {
        if let Some(term) = &self.search {
            if !matches_search(event, term) {
                return Some(Exclusion::Search);
            }
        }

        if let Some(category) = self.category {
            if !event.categories.iter().any(|c| c == category) {
                return Some(Exclusion::Category);
            }
        }

        if let Some(city) = self.city {
            if event.location.city.as_deref() != Some(city) {
                return Some(Exclusion::City);
            }
        }

        if !self.price_range.matches(event.price.amount) {
            return Some(Exclusion::Price);
        }

        if let Some(interests) = self.interests {
            if !event.matches_interests(interests) {
                return Some(Exclusion::Interest);
            }
        }

        if let Some(proximity) = &self.proximity {
            let Some(coords) = event.location.coordinates else {
                return Some(Exclusion::NoCoordinates);
            };
            if coords.distance_km(&proximity.origin) > proximity.radius_km {
                return Some(Exclusion::OutOfRange);
            }
        }

        None
    }
}

/// `term` must already be lower-cased.
fn matches_search(event: &Event, term: &str) -> bool {
    event.title.to_lowercase().contains(term)
        || event.description.to_lowercase().contains(term)
        || event.tags.iter().any(|t| t.to_lowercase().contains(term))
}

fn restriction(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != ALL)
}

fn resolve_radius(requested: Option<f64>, default_radius_km: f64) -> f64 {
    match requested {
        Some(r) if r.is_finite() => r.max(0.0),
        _ => default_radius_km,
    }
}

// ===========================================================================
// Unit tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::exclusion_reason;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn every_amount_lands_in_exactly_one_bucket() {
        let concrete = [
            PriceRange::Free,
            PriceRange::Under1000,
            PriceRange::Under2000,
            PriceRange::Above2000,
        ];
        for amount in [0.0, 0.01, 1.0, 500.0, 999.0, 999.99, 1000.0, 1500.0, 1999.99, 2000.0, 1e9] {
            let hits: Vec<_> = concrete.iter().filter(|r| r.matches(amount)).collect();
            assert_eq!(hits.len(), 1, "amount {amount} matched {hits:?}");
            assert_eq!(*hits[0], PriceRange::bucket_of(amount));
            assert!(PriceRange::All.matches(amount));
        }
    }

    #[test]
    fn unknown_price_range_degrades_to_all() {
        let config: FilterConfig = serde_json::from_value(json!({ "priceRange": "cheap" })).unwrap();
        assert_eq!(config.price_range, PriceRange::All);
        let config: FilterConfig = serde_json::from_value(json!({ "priceRange": "under_2000" })).unwrap();
        assert_eq!(config.price_range, PriceRange::Under2000);
        let config: FilterConfig = serde_json::from_value(json!({ "priceRange": null })).unwrap();
        assert_eq!(config.price_range, PriceRange::All);
    }

    #[test]
    fn non_string_price_range_degrades_to_all() {
        for raw in [json!(5), json!(true), json!(["free"]), json!({ "bucket": "free" })] {
            let config: FilterConfig = serde_json::from_value(json!({ "priceRange": raw })).unwrap();
            assert_eq!(config.price_range, PriceRange::All, "priceRange {raw}");
        }
    }

    #[test]
    fn query_string_values_are_read() {
        let config: FilterConfig = serde_json::from_value(json!({
            "page": "2",
            "pageSize": " 20 ",
            "radiusKm": "7.5",
            "nearby": "true",
            "onlyInterested": "1",
            "userLocation": { "lat": "18.52", "lng": "73.85" }
        }))
        .unwrap();
        assert_eq!((config.page, config.page_size), (Some(2), Some(20)));
        assert_eq!(config.radius_km, Some(7.5));
        assert!(config.nearby);
        assert!(config.only_interested);
        assert_eq!(config.user_location, Some(GeoPoint::new(18.52, 73.85)));
    }

    #[test]
    fn unreadable_values_count_as_absent() {
        let config: FilterConfig = serde_json::from_value(json!({
            "page": "second",
            "pageSize": 2.5,
            "radiusKm": "far",
            "nearby": "maybe",
            "userLocation": "Pune",
            "searchTerm": ["jazz"],
            "city": 411001
        }))
        .unwrap();
        assert_eq!((config.page, config.page_size), (None, None));
        assert_eq!(config.radius_km, None);
        assert!(!config.nearby);
        assert_eq!(config.user_location, None);
        assert_eq!(config.search_term, None);
        assert_eq!(config.city.as_deref(), Some("411001"));
    }

    #[test]
    fn exclusion_reasons_serialize_camel_case() {
        assert_eq!(serde_json::to_value(Exclusion::NoCoordinates).unwrap(), json!("noCoordinates"));
        let mut stats = ExclusionStats::default();
        stats.record(Exclusion::OutOfRange);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["outOfRange"], json!(1));
        assert_eq!(value["noCoordinates"], json!(0));
    }

    #[test]
    fn search_is_case_insensitive_over_title_description_and_tags() {
        let e = event(json!({
            "title": "Sunset Jazz",
            "description": "Live quartet on the terrace",
            "tags": ["Rooftop"]
        }));
        for term in ["JAZZ", "quartet", "roof", "  sunset  "] {
            let config = FilterConfig { search_term: Some(term.into()), ..Default::default() };
            assert_eq!(exclusion_reason(&e, &config, &[]), None, "term {term:?}");
        }
        let config = FilterConfig { search_term: Some("salsa".into()), ..Default::default() };
        assert_eq!(exclusion_reason(&e, &config, &[]), Some(Exclusion::Search));
    }

    #[test]
    fn blank_search_term_does_not_restrict() {
        let config = FilterConfig { search_term: Some("   ".into()), ..Default::default() };
        assert_eq!(exclusion_reason(&Event::default(), &config, &[]), None);
    }

    #[test]
    fn category_and_city_are_case_sensitive() {
        let e = event(json!({ "categories": ["Music"], "location": { "city": "Pune" } }));

        let config = FilterConfig { category: Some("music".into()), ..Default::default() };
        assert_eq!(exclusion_reason(&e, &config, &[]), Some(Exclusion::Category));

        let config = FilterConfig { city: Some("pune".into()), ..Default::default() };
        assert_eq!(exclusion_reason(&e, &config, &[]), Some(Exclusion::City));

        let config = FilterConfig {
            category: Some("Music".into()),
            city: Some("Pune".into()),
            ..Default::default()
        };
        assert_eq!(exclusion_reason(&e, &config, &[]), None);
    }

    #[test]
    fn all_sentinel_disables_category_and_city() {
        let config = FilterConfig {
            category: Some(ALL.into()),
            city: Some(ALL.into()),
            ..Default::default()
        };
        assert_eq!(exclusion_reason(&Event::default(), &config, &[]), None);
    }

    #[test]
    fn interest_filter_is_noop_without_interests() {
        let e = event(json!({ "categories": ["Art"] }));
        let config = FilterConfig { only_interested: true, ..Default::default() };
        assert_eq!(exclusion_reason(&e, &config, &[]), None);
        assert_eq!(
            exclusion_reason(&e, &config, &strings(&["Sports"])),
            Some(Exclusion::Interest)
        );
        assert_eq!(exclusion_reason(&e, &config, &strings(&["Sports", "Art"])), None);
    }

    #[test]
    fn nearby_drops_events_without_coordinates() {
        let config = FilterConfig {
            nearby: true,
            user_location: Some(GeoPoint::new(0.0, 0.0)),
            radius_km: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            exclusion_reason(&Event::default(), &config, &[]),
            Some(Exclusion::NoCoordinates)
        );
    }

    #[test]
    fn nearby_keeps_identical_coordinates_at_zero_radius() {
        let e = event(json!({ "coordinates": { "latitude": 18.52, "longitude": 73.85 } }));
        let config = FilterConfig {
            nearby: true,
            user_location: Some(GeoPoint::new(18.52, 73.85)),
            radius_km: Some(0.0),
            ..Default::default()
        };
        assert_eq!(exclusion_reason(&e, &config, &[]), None);

        let config = FilterConfig { radius_km: Some(-5.0), ..config };
        assert_eq!(exclusion_reason(&e, &config, &[]), None);
    }

    #[test]
    fn nearby_without_user_location_is_ignored() {
        let config = FilterConfig { nearby: true, ..Default::default() };
        assert_eq!(exclusion_reason(&Event::default(), &config, &[]), None);
    }

    #[test]
    fn missing_radius_uses_default() {
        // ~20km apart: inside the 25km default, outside an explicit 10km.
        let e = event(json!({ "coordinates": { "lat": 0.18, "lng": 0.0 } }));
        let config = FilterConfig {
            nearby: true,
            user_location: Some(GeoPoint::new(0.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(exclusion_reason(&e, &config, &[]), None);
        let config = FilterConfig { radius_km: Some(10.0), ..config };
        assert_eq!(exclusion_reason(&e, &config, &[]), Some(Exclusion::OutOfRange));
    }

    #[test]
    fn first_failing_predicate_is_reported() {
        let e = event(json!({ "title": "Pottery", "categories": ["Art"], "price": { "amount": 2500 } }));
        let config = FilterConfig {
            search_term: Some("pottery".into()),
            category: Some("Music".into()),
            price_range: PriceRange::Free,
            ..Default::default()
        };
        assert_eq!(exclusion_reason(&e, &config, &[]), Some(Exclusion::Category));
    }

    #[test]
    fn stats_count_each_reason() {
        let mut stats = ExclusionStats::default();
        stats.record(Exclusion::Price);
        stats.record(Exclusion::Price);
        stats.record(Exclusion::OutOfRange);
        assert_eq!(stats.price, 2);
        assert_eq!(stats.out_of_range, 1);
        assert_eq!(stats.total(), 3);
    }
}
