use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reading_map_shared::countries::COUNTRIES;
use reading_map_shared::time_format::age_label;
use reading_map_shared::{RingLayout, UserLocation, country};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Point,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn point(coordinates: [f64; 2], properties: Map<String, Value>) -> Self {
        Self {
            kind: "Feature",
            geometry: Point {
                kind: "Point",
                coordinates,
            },
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
}

/// Points carrying the Portuguese country names, one per known country.
pub fn country_labels() -> FeatureCollection {
    let features = COUNTRIES
        .iter()
        .map(|country| {
            let mut properties = Map::new();
            properties.insert("iso3".into(), json!(country.iso3));
            properties.insert("name".into(), json!(country.name));
            Feature::point(country.centroid, properties)
        })
        .collect();
    FeatureCollection::new(features)
}

/// Marker points for every user whose country has a known anchor. Users are
/// grouped per country and spread over concentric rings around the centroid;
/// within a country they keep their input order.
pub fn user_markers(
    users: &[UserLocation],
    layout: &RingLayout,
    now: DateTime<Utc>,
) -> FeatureCollection {
    let mut by_country: BTreeMap<&str, Vec<&UserLocation>> = BTreeMap::new();
    for user in users {
        by_country.entry(user.iso3.as_str()).or_default().push(user);
    }

    let mut features = Vec::with_capacity(users.len());
    for (iso3, members) in by_country {
        let Some(anchor) = country(iso3) else {
            warn!(iso3, users = members.len(), "no anchor for country, skipping markers");
            continue;
        };
        for placed in layout.layout(anchor.centroid, &members) {
            let properties = marker_properties(placed.member, placed.ring, now);
            features.push(Feature::point(placed.position, properties));
        }
    }
    FeatureCollection::new(features)
}

fn marker_properties(user: &UserLocation, ring: usize, now: DateTime<Utc>) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert("user".into(), json!(user.user));
    properties.insert("iso3".into(), json!(user.iso3));
    properties.insert("icon".into(), json!(user.sprite_name()));
    properties.insert("ring".into(), json!(ring));
    if let Some(book) = user.book_title() {
        properties.insert("book".into(), json!(book));
    }
    if let Some(seen) = user.seen_at() {
        properties.insert("seen".into(), json!(age_label(seen, now)));
    }
    properties
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn user(handle: &str, iso3: &str) -> UserLocation {
        UserLocation {
            user: handle.to_string(),
            iso3: iso3.to_string(),
            avatar_url: None,
            book: Some("Dom Casmurro".to_string()),
            country_name: None,
            timestamp: "2026-03-01T10:00:00Z".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn markers_ring_around_the_country_centroid() {
        let users: Vec<UserLocation> = (0..3).map(|i| user(&format!("u{i}"), "BRA")).collect();
        let markers = user_markers(&users, &RingLayout::default(), now());

        assert_eq!(markers.features.len(), 3);
        let centroid = country("BRA").unwrap().centroid;
        for feature in &markers.features {
            let [lon, lat] = feature.geometry.coordinates;
            let distance = (lon - centroid[0]).hypot(lat - centroid[1]);
            assert!((distance - 1.2).abs() < 1e-9);
            assert_eq!(feature.property("iso3"), Some("BRA"));
            assert_eq!(feature.property("book"), Some("Dom Casmurro"));
            assert_eq!(feature.property("seen"), Some("2h"));
        }
        assert_eq!(markers.features[0].property("icon"), Some("avatar-u0"));
    }

    #[test]
    fn unknown_countries_are_skipped_but_others_kept() {
        let users = vec![user("a", "ZZZ"), user("b", "PRT"), user("c", "PRT")];
        let markers = user_markers(&users, &RingLayout::default(), now());
        let handles: Vec<&str> = markers
            .features
            .iter()
            .filter_map(|f| f.property("user"))
            .collect();
        assert_eq!(handles, ["b", "c"]);
    }

    #[test]
    fn serializes_as_geojson() {
        let markers = user_markers(&[user("a", "PRT")], &RingLayout::default(), now());
        let value = serde_json::to_value(&markers).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(value["features"][0]["properties"]["user"], "a");
    }

    #[test]
    fn labels_cover_the_country_table() {
        let labels = country_labels();
        assert_eq!(labels.features.len(), COUNTRIES.len());
        let brazil = labels
            .features
            .iter()
            .find(|feature| feature.property("iso3") == Some("BRA"))
            .unwrap();
        assert_eq!(brazil.property("name"), Some("Brasil"));
    }
}
