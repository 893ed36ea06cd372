//! Source and layer definitions plus the data-driven fill expression.

use std::collections::BTreeMap;

use reading_map_shared::{CountryProgress, MonthConfig, NEUTRAL_COLOR, color_of};
use serde_json::{Value, json};

pub const COUNTRIES_SOURCE: &str = "countries";
pub const COUNTRY_LABELS_SOURCE: &str = "country-labels-source";
pub const USER_MARKERS_SOURCE: &str = "user-markers-source";

pub const COUNTRY_FILLS_LAYER: &str = "country-fills";
pub const COUNTRY_BORDERS_LAYER: &str = "country-borders";
pub const COUNTRY_LABELS_LAYER: &str = "country-labels-pt";
pub const USER_MARKERS_LAYER: &str = "user-markers";

pub const FILL_OPACITY: f64 = 0.9;

/// Feature property holding the country code in the vector country source.
pub const COUNTRY_CODE_PROPERTY: &str = "ADM0_A3";

pub fn countries_source() -> Value {
    json!({
        "type": "vector",
        "url": "mapbox://mapbox.country-boundaries-v1",
    })
}

pub fn empty_geojson_source() -> Value {
    json!({
        "type": "geojson",
        "data": { "type": "FeatureCollection", "features": [] },
    })
}

/// Layers in draw order.
pub fn base_layers() -> Vec<Value> {
    vec![
        json!({
            "id": COUNTRY_FILLS_LAYER,
            "type": "fill",
            "source": COUNTRIES_SOURCE,
            "source-layer": "country_boundaries",
            "paint": {
                "fill-color": NEUTRAL_COLOR,
                "fill-opacity": FILL_OPACITY,
            },
        }),
        json!({
            "id": COUNTRY_BORDERS_LAYER,
            "type": "line",
            "source": COUNTRIES_SOURCE,
            "source-layer": "country_boundaries",
            "paint": {
                "line-color": "#FFFFFF",
                "line-width": 0.5,
            },
        }),
        json!({
            "id": COUNTRY_LABELS_LAYER,
            "type": "symbol",
            "source": COUNTRY_LABELS_SOURCE,
            "layout": {
                "text-field": ["get", "name"],
                "text-size": 11,
            },
            "paint": {
                "text-color": "#374151",
                "text-halo-color": "#FFFFFF",
                "text-halo-width": 1,
            },
        }),
        json!({
            "id": USER_MARKERS_LAYER,
            "type": "symbol",
            "source": USER_MARKERS_SOURCE,
            "layout": {
                "icon-image": ["get", "icon"],
                "icon-size": 0.6,
                "icon-allow-overlap": true,
            },
        }),
    ]
}

/// One `match` over the country code covering every known progress entry.
/// Later duplicates win. With no entries the neutral color is returned as a
/// plain value.
pub fn fill_color_expression(progress: &[CountryProgress], palette: &[MonthConfig]) -> Value {
    let latest: BTreeMap<&str, i32> = progress
        .iter()
        .map(|entry| (entry.iso3.as_str(), entry.progress))
        .collect();
    if latest.is_empty() {
        return json!(NEUTRAL_COLOR);
    }

    let mut expression = vec![json!("match"), json!(["get", COUNTRY_CODE_PROPERTY])];
    for (iso3, progress) in latest {
        expression.push(json!(iso3));
        expression.push(json!(color_of(iso3, progress, palette)));
    }
    expression.push(json!(NEUTRAL_COLOR));
    Value::Array(expression)
}

#[cfg(test)]
mod tests {
    use reading_map_shared::MONTHS;

    use super::*;

    fn entry(iso3: &str, progress: i32) -> CountryProgress {
        CountryProgress {
            iso3: iso3.to_string(),
            progress,
        }
    }

    #[test]
    fn empty_progress_paints_neutral() {
        assert_eq!(fill_color_expression(&[], &MONTHS), json!("#F5F5F5"));
    }

    #[test]
    fn expression_maps_each_country_once_with_neutral_default() {
        let expr = fill_color_expression(
            &[entry("BRA", 10), entry("PRT", 90), entry("BRA", 25)],
            &MONTHS,
        );
        let january = &MONTHS[0];
        let portugal_month = MONTHS.iter().find(|m| m.contains("PRT")).unwrap();

        assert_eq!(
            expr,
            json!([
                "match",
                ["get", "ADM0_A3"],
                "BRA",
                january.tier_color(2),
                "PRT",
                portugal_month.full_color(),
                "#F5F5F5"
            ])
        );
    }

    #[test]
    fn unassigned_country_resolves_neutral() {
        let expr = fill_color_expression(&[entry("XXX", 50)], &MONTHS);
        assert_eq!(expr[3], json!("#F5F5F5"));
    }

    #[test]
    fn layers_are_ordered_fills_first() {
        let ids: Vec<String> = base_layers()
            .iter()
            .map(|layer| layer["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["country-fills", "country-borders", "country-labels-pt", "user-markers"]);
    }
}
