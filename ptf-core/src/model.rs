//! Domain data structures for layers, positions and features.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mean earth radius in metres (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Property keys tried, in order, when looking for a human-readable label.
const LABEL_KEYS: [&str; 6] = ["name", "bezeichnung", "title", "standort", "adresse", "address"];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier for a layer known to ptf.
pub struct LayerId(pub String);

impl fmt::Display for LayerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata describing a layer.
pub struct LayerMeta {
    /// Unique identifier.
    pub id: LayerId,
    /// Display title.
    pub title: String,
    /// Workspace-qualified type name used in WMS/WFS requests.
    pub type_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 position in degrees.
pub struct Position {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

impl Position {
    /// Create a position from longitude and latitude.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance in metres (haversine).
    #[must_use]
    pub fn distance_to(&self, other: &Position) -> f64 {
        let lat_a = self.lat.to_radians();
        let lat_b = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let hav = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * hav.sqrt().min(1.0).asin()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier of a feature within its layer.
pub struct FeatureId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Single feature returned by a provider.
pub struct Feature {
    /// Provider identifier.
    pub id: FeatureId,
    /// Layer the feature belongs to.
    pub layer: LayerId,
    /// Location, when the geometry could be reduced to a point.
    pub position: Option<Position>,
    /// Attribute table of the feature.
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    /// Human-friendly label taken from the usual name-like attributes, falling back to the id.
    #[must_use]
    pub fn label(&self) -> String {
        LABEL_KEYS
            .iter()
            .find_map(|wanted| {
                self.properties
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
                    .and_then(|(_, value)| value.as_str())
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
            })
            .map_or_else(|| self.id.0.clone(), str::to_owned)
    }

    /// Attribute rendered as display text; `None` when missing or null.
    #[must_use]
    pub fn property_text(&self, key: &str) -> Option<String> {
        self.properties.get(key).and_then(value_text)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(if *flag { "yes" } else { "no" }.to_owned()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feature(properties: Value) -> Feature {
        let properties = match properties {
            Value::Object(map) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Feature {
            id: FeatureId("toilets_kiel.7".to_owned()),
            layer: LayerId("ptf:toilets_kiel".to_owned()),
            position: None,
            properties,
        }
    }

    #[test]
    fn distance_between_known_points() {
        // Kiel main station to Kiel town hall, roughly 650 m apart.
        let station = Position::new(10.131_975, 54.315_036);
        let town_hall = Position::new(10.134_742, 54.320_812);
        let distance = station.distance_to(&town_hall);
        assert!((600.0..700.0).contains(&distance), "got {distance}");
        assert!(station.distance_to(&station).abs() < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let first = Position::new(10.0, 54.0);
        let second = Position::new(11.0, 55.0);
        let delta = first.distance_to(&second) - second.distance_to(&first);
        assert!(delta.abs() < 1e-6);
    }

    #[test]
    fn label_prefers_name_like_attributes() {
        let named = feature(json!({ "Bezeichnung": "Toilette Hauptbahnhof", "name": "" }));
        assert_eq!(named.label(), "Toilette Hauptbahnhof");

        let anonymous = feature(json!({ "oeffnungszeiten": "24h" }));
        assert_eq!(anonymous.label(), "toilets_kiel.7");
    }

    #[test]
    fn property_text_renders_scalars() {
        let item = feature(json!({
            "barrierefrei": true,
            "gebuehr": 0.5,
            "hinweis": null,
            "ort": "Alter Markt",
        }));
        assert_eq!(item.property_text("barrierefrei").as_deref(), Some("yes"));
        assert_eq!(item.property_text("gebuehr").as_deref(), Some("0.5"));
        assert_eq!(item.property_text("hinweis"), None);
        assert_eq!(item.property_text("ort").as_deref(), Some("Alter Markt"));
        assert_eq!(item.property_text("missing"), None);
    }
}
