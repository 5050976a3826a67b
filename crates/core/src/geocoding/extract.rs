//! Coordinate extraction from provider payloads
//!
//! Providers answer in several shapes. Each shape gets its own strategy, a
//! pure function from the parsed payload to an optional coordinate pair, and
//! [`extract_coordinates`] tries them in priority order.
//!
//! Field alternatives behave like a null-coalescing chain: the first key that
//! is present and non-null is taken, and if its value is not a number the
//! entry is skipped rather than falling through to the next key.

use super::Coordinates;
use serde_json::Value;

/// A single response-shape strategy
pub type ExtractionStrategy = fn(&Value) -> Option<Coordinates>;

/// Strategies in priority order; the first to yield coordinates wins
pub const STRATEGIES: &[(&str, ExtractionStrategy)] = &[
    ("features", from_features),
    ("results", from_results),
    ("locations", from_locations),
    ("top_level", from_top_level),
];

/// Run every strategy in order and return the first hit
pub fn extract_coordinates(payload: &Value) -> Option<Coordinates> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let coordinates = strategy(payload)?;
        tracing::debug!("Coordinates extracted using '{}' shape", name);
        Some(coordinates)
    })
}

/// GeoJSON-style `features[]`, reading `geometry.coordinates` as
/// `[longitude, latitude, ...]` or a lat/lon pair under `properties`
pub fn from_features(payload: &Value) -> Option<Coordinates> {
    entries(payload, "features")?.iter().find_map(|feature| {
        geometry_point(feature).or_else(|| {
            let properties = feature.get("properties");
            pair(
                coalesce(&[field(properties, "lat"), field(properties, "latitude")]),
                coalesce(&[field(properties, "lon"), field(properties, "longitude")]),
            )
        })
    })
}

/// `results[]` entries with a nested `location` object or flat `lat`/`lon`
pub fn from_results(payload: &Value) -> Option<Coordinates> {
    entries(payload, "results")?.iter().find_map(|result| {
        let location = result.get("location");
        pair(
            coalesce(&[
                field(location, "lat"),
                field(location, "latitude"),
                result.get("lat"),
            ]),
            coalesce(&[
                field(location, "lng"),
                field(location, "longitude"),
                result.get("lon"),
            ]),
        )
    })
}

/// `locations[]` entries carrying flat coordinates
pub fn from_locations(payload: &Value) -> Option<Coordinates> {
    entries(payload, "locations")?.iter().find_map(|location| {
        pair(
            coalesce(&[location.get("lat"), location.get("latitude")]),
            coalesce(&[
                location.get("lon"),
                location.get("longitude"),
                location.get("lng"),
            ]),
        )
    })
}

/// Bare `latitude`/`longitude` on the payload itself
pub fn from_top_level(payload: &Value) -> Option<Coordinates> {
    pair(payload.get("latitude"), payload.get("longitude"))
}

fn entries<'a>(payload: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
}

fn geometry_point(feature: &Value) -> Option<Coordinates> {
    let position = feature
        .get("geometry")
        .and_then(|geometry| geometry.get("coordinates"))
        .and_then(Value::as_array)
        .filter(|position| position.len() >= 2)?;

    pair(position.get(1), position.first())
}

fn field<'a>(parent: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    parent.and_then(|value| value.get(key))
}

fn coalesce<'a>(candidates: &[Option<&'a Value>]) -> Option<&'a Value> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| !value.is_null())
}

fn pair(latitude: Option<&Value>, longitude: Option<&Value>) -> Option<Coordinates> {
    let latitude = latitude?.as_f64()?;
    let longitude = longitude?.as_f64()?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}
