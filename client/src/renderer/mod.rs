//! The seam between the sync engine and whatever draws the map.

mod tracing_renderer;
#[cfg(test)]
pub(crate) mod recording;

use image::RgbaImage;
use serde_json::{Map, Value};

use crate::geojson::FeatureCollection;

pub use tracing_renderer::LogRenderer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    Click,
    MouseMove,
    MouseLeave,
}

/// A feature hit by a point query.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer: String,
    pub properties: Map<String, Value>,
}

impl RenderedFeature {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// Operations the controller needs from a map renderer.
///
/// Sources and layers are described as style JSON. `add_sprite` replaces any
/// sprite already registered under `name`.
pub trait MapRenderer {
    fn add_source(&mut self, id: &str, source: Value);
    fn add_layer(&mut self, layer: Value);
    fn set_source_data(&mut self, source: &str, data: &FeatureCollection);
    fn set_paint_property(&mut self, layer: &str, property: &str, value: Value);

    fn add_sprite(&mut self, name: &str, sprite: &RgbaImage);
    fn remove_sprite(&mut self, name: &str);

    /// Features under `point` from the given layers, topmost first.
    fn query_features(&self, point: ScreenPoint, layers: &[&str]) -> Vec<RenderedFeature>;

    fn subscribe(&mut self, layer: &str, event: PointerEvent);
    fn unsubscribe(&mut self, layer: &str, event: PointerEvent);
}
