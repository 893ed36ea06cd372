use std::collections::HashSet;

use image::RgbaImage;
use serde_json::Value;
use tracing::{debug, info};

use super::{MapRenderer, PointerEvent, RenderedFeature, ScreenPoint};
use crate::geojson::FeatureCollection;

/// Headless renderer that only logs what it is asked to draw.
#[derive(Debug, Default)]
pub struct LogRenderer {
    sprites: HashSet<String>,
    paint_updates: u64,
}

impl LogRenderer {
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn paint_updates(&self) -> u64 {
        self.paint_updates
    }
}

impl MapRenderer for LogRenderer {
    fn add_source(&mut self, id: &str, _source: Value) {
        info!(source = id, "source added");
    }

    fn add_layer(&mut self, layer: Value) {
        info!(layer = %layer["id"], "layer added");
    }

    fn set_source_data(&mut self, source: &str, data: &FeatureCollection) {
        info!(source, features = data.features.len(), "source data updated");
    }

    fn set_paint_property(&mut self, layer: &str, property: &str, value: Value) {
        self.paint_updates += 1;
        let branches = value.as_array().map_or(0, |expr| expr.len().saturating_sub(3) / 2);
        info!(layer, property, branches, "paint updated");
    }

    fn add_sprite(&mut self, name: &str, sprite: &RgbaImage) {
        let replaced = !self.sprites.insert(name.to_string());
        debug!(sprite = name, width = sprite.width(), replaced, "sprite registered");
    }

    fn remove_sprite(&mut self, name: &str) {
        self.sprites.remove(name);
    }

    fn query_features(&self, _point: ScreenPoint, _layers: &[&str]) -> Vec<RenderedFeature> {
        Vec::new()
    }

    fn subscribe(&mut self, layer: &str, event: PointerEvent) {
        debug!(layer, ?event, "subscribed");
    }

    fn unsubscribe(&mut self, layer: &str, event: PointerEvent) {
        debug!(layer, ?event, "unsubscribed");
    }
}
