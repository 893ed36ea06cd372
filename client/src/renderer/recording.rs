use std::collections::{HashMap, HashSet};

use image::RgbaImage;
use serde_json::{Map, Value};

use super::{MapRenderer, PointerEvent, RenderedFeature, ScreenPoint};
use crate::geojson::FeatureCollection;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddSource(String),
    AddLayer(String),
    SetSourceData(String),
    SetPaint { layer: String, property: String, value: Value },
    AddSprite(String),
    RemoveSprite(String),
}

/// Renderer double that keeps everything it is told.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<Call>,
    pub sprites: HashMap<String, RgbaImage>,
    pub sources: HashMap<String, FeatureCollection>,
    pub subscriptions: HashSet<(String, PointerEvent)>,
    hits: Vec<(ScreenPoint, RenderedFeature)>,
}

impl RecordingRenderer {
    /// Make `query_features` at `point` return a feature on `layer`.
    pub fn place(&mut self, point: ScreenPoint, layer: &str, properties: &[(&str, &str)]) {
        let properties: Map<String, Value> = properties
            .iter()
            .map(|(key, value)| ((*key).to_string(), Value::from(*value)))
            .collect();
        self.hits.push((
            point,
            RenderedFeature {
                layer: layer.to_string(),
                properties,
            },
        ));
    }

    pub fn paint_values(&self, layer: &str, property: &str) -> Vec<&Value> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetPaint {
                    layer: l,
                    property: p,
                    value,
                } if l == layer && p == property => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl MapRenderer for RecordingRenderer {
    fn add_source(&mut self, id: &str, _source: Value) {
        self.calls.push(Call::AddSource(id.to_string()));
    }

    fn add_layer(&mut self, layer: Value) {
        let id = layer["id"].as_str().unwrap_or_default().to_string();
        self.calls.push(Call::AddLayer(id));
    }

    fn set_source_data(&mut self, source: &str, data: &FeatureCollection) {
        self.calls.push(Call::SetSourceData(source.to_string()));
        self.sources.insert(source.to_string(), data.clone());
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: Value) {
        self.calls.push(Call::SetPaint {
            layer: layer.to_string(),
            property: property.to_string(),
            value,
        });
    }

    fn add_sprite(&mut self, name: &str, sprite: &RgbaImage) {
        self.calls.push(Call::AddSprite(name.to_string()));
        self.sprites.insert(name.to_string(), sprite.clone());
    }

    fn remove_sprite(&mut self, name: &str) {
        self.calls.push(Call::RemoveSprite(name.to_string()));
        self.sprites.remove(name);
    }

    fn query_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<RenderedFeature> {
        self.hits
            .iter()
            .filter(|(at, feature)| *at == point && layers.contains(&feature.layer.as_str()))
            .map(|(_, feature)| feature.clone())
            .collect()
    }

    fn subscribe(&mut self, layer: &str, event: PointerEvent) {
        self.subscriptions.insert((layer.to_string(), event));
    }

    fn unsubscribe(&mut self, layer: &str, event: PointerEvent) {
        self.subscriptions.remove(&(layer.to_string(), event));
    }
}
