pub mod api;
pub mod config;
pub mod controller;
pub mod fetch;
pub mod geojson;
pub mod image_loader;
pub mod poller;
pub mod popup;
pub mod renderer;
pub mod sprites;
pub mod stale_guard;
pub mod style;

#[cfg(test)]
mod test_support;
