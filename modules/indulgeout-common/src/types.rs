use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::lenient;

// --- Geo Types ---

/// Canonical coordinate pair.
///
/// Event records arrive in two shapes, `{lat, lng}` and the older
/// `{latitude, longitude}`. Both deserialize into this type; if a record
/// carries both, the short keys win.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        read_coordinates(&value)
            .ok_or_else(|| de::Error::custom("expected {lat, lng} or {latitude, longitude}"))
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within WGS84 bounds.
    pub fn is_usable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine great-circle distance between two lat/lng points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

// --- Event ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    pub city: Option<String>,
    pub coordinates: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Price {
    /// Non-negative. Zero means free.
    pub amount: f64,
}

impl Price {
    pub fn is_free(&self) -> bool {
        self.amount == 0.0
    }
}

/// A normalized event listing.
///
/// Built from whatever the events endpoint returned via [`RawEvent`]; every
/// field has a safe default so a sparse record never has to be rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    /// Start time. `None` when the record had no date or one we could not parse.
    pub date: Option<DateTime<Utc>>,
    pub location: Location,
    pub price: Price,
    pub tags: Vec<String>,
}

impl Event {
    /// True when any category appears in `interests`.
    pub fn matches_interests(&self, interests: &[String]) -> bool {
        self.categories.iter().any(|c| interests.contains(c))
    }
}

// --- Raw records (wire shapes) ---

/// An event record exactly as the backend sends it.
///
/// Every field is kept as raw JSON so that one badly typed field cannot
/// reject the whole record. `id` and `_id` are separate fields because
/// Mongoose emits both when virtuals are serialized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Option<Value>,
    #[serde(rename = "_id")]
    pub mongo_id: Option<Value>,
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub categories: Option<Value>,
    pub date: Option<Value>,
    pub location: Option<Value>,
    pub coordinates: Option<Value>,
    pub price: Option<Value>,
    pub tags: Option<Value>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        let id = raw
            .id
            .as_ref()
            .and_then(id_to_string)
            .or_else(|| raw.mongo_id.as_ref().and_then(id_to_string))
            .unwrap_or_default();

        let date = raw.date.as_ref().and_then(parse_event_date);
        if date.is_none() {
            debug!(event_id = %id, raw_date = ?raw.date, "Event has no usable date, treating as far-future");
        }

        let amount = match raw.price.as_ref().map(price_amount) {
            Some(Some(a)) if a >= 0.0 => a,
            Some(_) => {
                debug!(event_id = %id, price = ?raw.price, "Unusable price, treating as free");
                0.0
            }
            None => 0.0,
        };

        let location = raw.location.as_ref();
        let city = location
            .and_then(|l| l.get("city"))
            .and_then(lenient::string);
        let coordinates = location
            .and_then(|l| l.get("coordinates"))
            .and_then(normalize_coordinates)
            .or_else(|| raw.coordinates.as_ref().and_then(normalize_coordinates));

        let text = |v: &Option<Value>| v.as_ref().and_then(lenient::string).unwrap_or_default();
        let list = |v: &Option<Value>| v.as_ref().map(lenient::strings).unwrap_or_default();

        Event {
            title: text(&raw.title),
            description: text(&raw.description),
            categories: list(&raw.categories),
            tags: list(&raw.tags),
            id,
            date,
            location: Location { city, coordinates },
            price: Price { amount },
        }
    }
}

/// `{"amount": ...}` or a bare amount. An object without `amount` is free.
fn price_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => map.get("amount").map_or(Some(0.0), lenient::number),
        other => lenient::number(other),
    }
}

/// Read either coordinate shape, taking the first key of each pair that holds
/// a number. No range check.
pub fn read_coordinates(value: &Value) -> Option<GeoPoint> {
    let first = |keys: [&str; 2]| keys.iter().find_map(|k| value.get(*k).and_then(lenient::number));
    Some(GeoPoint::new(first(["lat", "latitude"])?, first(["lng", "longitude"])?))
}

/// Collapse a raw coordinate record into a usable [`GeoPoint`], if it is one.
pub fn normalize_coordinates(value: &Value) -> Option<GeoPoint> {
    read_coordinates(value).filter(GeoPoint::is_usable)
}

/// Parse the date shapes the events endpoint has been seen to emit:
/// RFC 3339, naive ISO datetimes (assumed UTC), bare dates, and epoch millis.
pub fn parse_event_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| lenient::integer(value))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn id_to_string(value: &Value) -> Option<String> {
    let id = match value {
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(map) => map.get("$oid").and_then(lenient::string),
        other => lenient::string(other),
    }?;
    (!id.is_empty()).then_some(id)
}
