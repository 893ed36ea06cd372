//! Keeps the rendered map in step with the backend.
//!
//! The controller owns all view state: country progress, the user list, the
//! sprite cache, the popup and the error banner. It is driven from a single
//! task, so none of this needs locking. Work that arrives before the renderer
//! has its base layers is stored and applied once they exist.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use image::RgbaImage;
use reading_map_shared::{
    CountryProgress, MonthConfig, ReadingsResponse, RingLayout, StatsResponse, UserLocation,
    UsersResponse,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::fetch::FetchError;
use crate::geojson;
use crate::image_loader::{BoundedImageLoader, ImageQueueItem, SpriteDelivery, SpriteOutcome};
use crate::poller::{PollUpdate, Resource};
use crate::popup::{HoverInfo, PopupState};
use crate::renderer::{MapRenderer, PointerEvent, ScreenPoint};
use crate::sprites;
use crate::stale_guard::{KeyedFetch, StaleGuardedCoordinator};
use crate::style::{
    self, COUNTRIES_SOURCE, COUNTRY_CODE_PROPERTY, COUNTRY_FILLS_LAYER, COUNTRY_LABELS_SOURCE,
    USER_MARKERS_LAYER, USER_MARKERS_SOURCE,
};

pub const ERROR_BANNER_TEXT: &str = "Erro ao carregar dados. Tentando novamente...";

pub type ReadingsResult = Result<ReadingsResponse, FetchError>;
pub type ReadingsCoordinator = StaleGuardedCoordinator<String, ReadingsResult>;

/// Fetch function for the popup coordinator backed by the API client.
pub fn readings_fetch(api: Arc<ApiClient>) -> KeyedFetch<String, ReadingsResult> {
    Arc::new(move |iso3: String| {
        let api = Arc::clone(&api);
        async move { api.fetch_readings(&iso3).await }.boxed()
    })
}

/// Input from the host map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    StyleLoaded,
    Click(ScreenPoint),
    PointerMove(ScreenPoint),
    PointerLeave,
    ClosePopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Placeholder,
    Avatar,
    Fallback,
}

/// Receivers drained by [`MapSyncController::run`].
pub struct ControllerInputs {
    pub events: mpsc::Receiver<MapEvent>,
    pub updates: mpsc::Receiver<PollUpdate>,
    pub sprites: mpsc::UnboundedReceiver<SpriteDelivery>,
    pub readings: mpsc::UnboundedReceiver<(String, ReadingsResult)>,
}

pub struct MapSyncController<R> {
    renderer: R,
    palette: Vec<MonthConfig>,
    ring_layout: RingLayout,
    sprite_size: u32,
    layers_ready: bool,
    countries: Vec<CountryProgress>,
    users: Vec<UserLocation>,
    markers_built: bool,
    processed_users: HashSet<String>,
    sprites: HashMap<String, SpriteKind>,
    loader: BoundedImageLoader,
    readings: ReadingsCoordinator,
    popup: Option<PopupState>,
    hover: Option<HoverInfo>,
    failures: HashMap<Resource, String>,
}

impl<R: MapRenderer> MapSyncController<R> {
    pub fn new(
        renderer: R,
        loader: BoundedImageLoader,
        readings: ReadingsCoordinator,
        palette: Vec<MonthConfig>,
        ring_layout: RingLayout,
        sprite_size: u32,
    ) -> Self {
        Self {
            renderer,
            palette,
            ring_layout,
            sprite_size,
            layers_ready: false,
            countries: Vec::new(),
            users: Vec::new(),
            markers_built: false,
            processed_users: HashSet::new(),
            sprites: HashMap::new(),
            loader,
            readings,
            popup: None,
            hover: None,
            failures: HashMap::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn loader(&self) -> &BoundedImageLoader {
        &self.loader
    }

    pub fn popup(&self) -> Option<&PopupState> {
        self.popup.as_ref()
    }

    pub fn hover(&self) -> Option<&HoverInfo> {
        self.hover.as_ref()
    }

    pub fn sprite_kind(&self, name: &str) -> Option<SpriteKind> {
        self.sprites.get(name).copied()
    }

    pub fn readings_guard(&self) -> &ReadingsCoordinator {
        &self.readings
    }

    /// Non-blocking error banner, shown while any poller is failing.
    pub fn banner(&self) -> Option<&'static str> {
        (!self.failures.is_empty()).then_some(ERROR_BANNER_TEXT)
    }

    /// Create sources and layers once, then apply whatever arrived before.
    pub fn on_style_loaded(&mut self) {
        if self.layers_ready {
            debug!("style reloaded, layers already present");
            return;
        }
        self.renderer.add_source(COUNTRIES_SOURCE, style::countries_source());
        self.renderer
            .add_source(COUNTRY_LABELS_SOURCE, style::empty_geojson_source());
        self.renderer
            .add_source(USER_MARKERS_SOURCE, style::empty_geojson_source());
        for layer in style::base_layers() {
            self.renderer.add_layer(layer);
        }
        self.renderer
            .set_source_data(COUNTRY_LABELS_SOURCE, &geojson::country_labels());
        for layer in [COUNTRY_FILLS_LAYER, USER_MARKERS_LAYER] {
            self.renderer.subscribe(layer, PointerEvent::Click);
        }
        self.renderer.subscribe(COUNTRY_FILLS_LAYER, PointerEvent::MouseMove);
        self.renderer.subscribe(COUNTRY_FILLS_LAYER, PointerEvent::MouseLeave);
        self.layers_ready = true;
        info!("base layers ready");

        self.paint_countries();
        self.rebuild_markers();
    }

    pub fn apply_stats(&mut self, stats: &StatsResponse) {
        self.countries = stats.countries.clone();
        self.paint_countries();
    }

    fn paint_countries(&mut self) {
        if !self.layers_ready {
            debug!(countries = self.countries.len(), "layers not ready, deferring paint");
            return;
        }
        let expression = style::fill_color_expression(&self.countries, &self.palette);
        self.renderer
            .set_paint_property(COUNTRY_FILLS_LAYER, "fill-color", expression);
    }

    pub fn apply_users(&mut self, users: &UsersResponse) {
        if self.markers_built && self.users == users.users {
            debug!("user list unchanged");
            return;
        }
        self.users = users.users.clone();
        self.rebuild_markers();
    }

    fn rebuild_markers(&mut self) {
        if !self.layers_ready {
            debug!(users = self.users.len(), "layers not ready, deferring markers");
            return;
        }

        let mut queue = Vec::new();
        for user in &self.users {
            if !self.processed_users.insert(user.user.clone()) {
                continue;
            }
            let sprite_name = user.sprite_name();
            if !self.sprites.contains_key(&sprite_name) {
                let placeholder = sprites::placeholder_sprite(self.sprite_size, &user.user);
                self.renderer.add_sprite(&sprite_name, &placeholder);
                self.sprites.insert(sprite_name.clone(), SpriteKind::Placeholder);
            }
            if let Some(url) = user.avatar() {
                queue.push(ImageQueueItem {
                    url: url.to_string(),
                    sprite_name,
                });
            }
        }
        if !queue.is_empty() {
            debug!(count = queue.len(), "queueing new avatars");
            self.loader.enqueue(queue);
        }

        let markers = geojson::user_markers(&self.users, &self.ring_layout, Utc::now());
        self.renderer.set_source_data(USER_MARKERS_SOURCE, &markers);
        self.markers_built = true;
    }

    /// A real avatar replaces whatever is registered. A fallback only fills a
    /// gap, so an existing placeholder or avatar is kept.
    pub fn apply_sprite(&mut self, delivery: SpriteDelivery) {
        let name = delivery.sprite_name;
        match delivery.outcome {
            SpriteOutcome::Ready(image) => self.register_sprite(name, &image, SpriteKind::Avatar),
            SpriteOutcome::Fallback { image, reason } => {
                if self.sprites.contains_key(&name) {
                    debug!(sprite = %name, reason = %reason, "keeping existing sprite");
                } else {
                    self.register_sprite(name, &image, SpriteKind::Fallback);
                }
            }
        }
    }

    fn register_sprite(&mut self, name: String, image: &RgbaImage, kind: SpriteKind) {
        self.renderer.add_sprite(&name, image);
        self.sprites.insert(name, kind);
    }

    pub fn handle_click(&mut self, point: ScreenPoint) {
        let hit = self
            .renderer
            .query_features(point, &[USER_MARKERS_LAYER, COUNTRY_FILLS_LAYER])
            .into_iter()
            .find_map(|feature| {
                feature
                    .property("iso3")
                    .or_else(|| feature.property(COUNTRY_CODE_PROPERTY))
                    .map(str::to_string)
            });
        match hit {
            Some(iso3) => self.open_popup(&iso3, point),
            None => self.close_popup(),
        }
    }

    pub fn open_popup(&mut self, iso3: &str, anchor: ScreenPoint) {
        debug!(iso3, "opening popup");
        self.popup = Some(PopupState::open(iso3, anchor));
        self.readings.request(iso3.to_string());
    }

    pub fn close_popup(&mut self) {
        if self.popup.take().is_some() {
            debug!("popup closed");
        }
        self.readings.close();
    }

    pub fn apply_readings(&mut self, iso3: String, result: ReadingsResult) {
        let Some(result) = self.readings.on_result(iso3.clone(), result) else {
            return;
        };
        match self.popup.as_mut() {
            Some(popup) if popup.iso3 == iso3 => popup.resolve(result),
            _ => debug!(iso3, "no popup for readings"),
        }
    }

    pub fn handle_hover(&mut self, point: ScreenPoint) {
        let iso3 = self
            .renderer
            .query_features(point, &[COUNTRY_FILLS_LAYER])
            .into_iter()
            .find_map(|feature| feature.property(COUNTRY_CODE_PROPERTY).map(str::to_string));
        self.hover = iso3.and_then(|iso3| {
            self.countries
                .iter()
                .rev()
                .find(|entry| entry.iso3 == iso3)
                .map(|entry| HoverInfo::new(&iso3, entry.progress, &self.palette))
        });
    }

    pub fn apply_poll_update(&mut self, update: PollUpdate) {
        match update {
            PollUpdate::Stats(stats) => {
                self.clear_failure(Resource::Stats);
                self.apply_stats(&stats);
            }
            PollUpdate::Users(users) => {
                self.clear_failure(Resource::Users);
                self.apply_users(&users);
            }
            PollUpdate::Failed { resource, error } => {
                warn!(%resource, error = %error, "showing error banner");
                self.failures.insert(resource, error.to_string());
            }
        }
    }

    fn clear_failure(&mut self, resource: Resource) {
        if self.failures.remove(&resource).is_some() {
            info!(%resource, "recovered");
        }
    }

    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::StyleLoaded => self.on_style_loaded(),
            MapEvent::Click(point) => self.handle_click(point),
            MapEvent::PointerMove(point) => self.handle_hover(point),
            MapEvent::PointerLeave => self.hover = None,
            MapEvent::ClosePopup => self.close_popup(),
        }
    }

    /// Drop everything registered with the renderer so a new style can be
    /// set up from scratch. Loaded data is kept and reapplied on the next
    /// style load.
    pub fn teardown(&mut self) {
        if self.layers_ready {
            for layer in [COUNTRY_FILLS_LAYER, USER_MARKERS_LAYER] {
                self.renderer.unsubscribe(layer, PointerEvent::Click);
            }
            self.renderer.unsubscribe(COUNTRY_FILLS_LAYER, PointerEvent::MouseMove);
            self.renderer.unsubscribe(COUNTRY_FILLS_LAYER, PointerEvent::MouseLeave);
        }
        for name in self.sprites.keys() {
            self.renderer.remove_sprite(name);
        }
        self.sprites.clear();
        self.processed_users.clear();
        self.close_popup();
        self.hover = None;
        self.layers_ready = false;
        self.markers_built = false;
    }

    /// Process inputs until the host event channel closes.
    pub async fn run(mut self, mut inputs: ControllerInputs) -> Self {
        info!("map sync started");
        loop {
            tokio::select! {
                event = inputs.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(update) = inputs.updates.recv() => self.apply_poll_update(update),
                Some(delivery) = inputs.sprites.recv() => self.apply_sprite(delivery),
                Some((iso3, result)) = inputs.readings.recv() => self.apply_readings(iso3, result),
            }
        }
        self.teardown();
        info!("map sync stopped");
        self
    }
}
