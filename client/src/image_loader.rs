//! Avatar loading with a fixed cap on concurrent work.
//!
//! Items wait in a FIFO queue. Whenever a slot frees up the loader admits the
//! next item immediately, so the cap is work-conserving rather than batched.
//! Each admitted item runs on its own task: fetch the bytes, rasterize on the
//! blocking pool, then hand the sprite to the controller over a channel.

use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures::FutureExt;
use image::RgbaImage;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::sprites;

pub type ImageFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, String>> + Send + 'a>>;

/// Where avatar bytes come from.
pub trait ImageSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> ImageFuture<'a>;
}

/// Production source: goes through the image proxy with a short retry budget.
pub struct ProxiedImageSource {
    api: Arc<ApiClient>,
}

impl ProxiedImageSource {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

impl ImageSource for ProxiedImageSource {
    fn fetch<'a>(&'a self, url: &'a str) -> ImageFuture<'a> {
        Box::pin(async move { self.api.fetch_image(url).await.map_err(|e| e.to_string()) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQueueItem {
    pub url: String,
    pub sprite_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpriteOutcome {
    Ready(RgbaImage),
    Fallback { image: RgbaImage, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDelivery {
    pub sprite_name: String,
    pub outcome: SpriteOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderProgress {
    pub loaded: usize,
    pub total: usize,
    pub active: usize,
    pub queued: usize,
}

impl LoaderProgress {
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.queued == 0
    }
}

#[derive(Default)]
struct LoaderState {
    queue: VecDeque<ImageQueueItem>,
    active: usize,
    loaded: usize,
    total: usize,
}

impl LoaderState {
    fn progress(&self) -> LoaderProgress {
        LoaderProgress {
            loaded: self.loaded,
            total: self.total,
            active: self.active,
            queued: self.queue.len(),
        }
    }
}

struct LoaderInner {
    source: Arc<dyn ImageSource>,
    concurrency: usize,
    sprite_size: u32,
    state: Mutex<LoaderState>,
    progress: watch::Sender<LoaderProgress>,
    deliveries: mpsc::UnboundedSender<SpriteDelivery>,
}

#[derive(Clone)]
pub struct BoundedImageLoader {
    inner: Arc<LoaderInner>,
}

impl BoundedImageLoader {
    pub fn new(
        source: Arc<dyn ImageSource>,
        concurrency: usize,
        sprite_size: u32,
    ) -> (Self, mpsc::UnboundedReceiver<SpriteDelivery>) {
        let (deliveries, rx) = mpsc::unbounded_channel();
        let (progress, _) = watch::channel(LoaderProgress::default());
        let loader = Self {
            inner: Arc::new(LoaderInner {
                source,
                concurrency: concurrency.max(1),
                sprite_size,
                state: Mutex::new(LoaderState::default()),
                progress,
                deliveries,
            }),
        };
        (loader, rx)
    }

    /// Append items to the queue and start as many as free slots allow.
    /// Enqueueing into an idle loader starts a fresh progress count.
    pub fn enqueue(&self, items: impl IntoIterator<Item = ImageQueueItem>) {
        let items: Vec<ImageQueueItem> = items.into_iter().collect();
        if items.is_empty() {
            return;
        }
        {
            let mut state = self.lock_state();
            if state.active == 0 && state.queue.is_empty() {
                state.loaded = 0;
                state.total = 0;
                info!(count = items.len(), "image queue starting");
            } else {
                debug!(count = items.len(), "merging into running image queue");
            }
            state.total += items.len();
            state.queue.extend(items);
        }
        self.pump();
    }

    pub fn progress(&self) -> LoaderProgress {
        self.lock_state().progress()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoaderProgress> {
        self.inner.progress.subscribe()
    }

    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so this only ends once idle.
        let _ = rx.wait_for(LoaderProgress::is_idle).await;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, LoaderState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pump(&self) {
        let (admitted, progress) = {
            let mut state = self.lock_state();
            let mut admitted = Vec::new();
            while state.active < self.inner.concurrency {
                let Some(item) = state.queue.pop_front() else {
                    break;
                };
                state.active += 1;
                admitted.push(item);
            }
            (admitted, state.progress())
        };
        self.inner.progress.send_replace(progress);

        for item in admitted {
            let loader = self.clone();
            tokio::spawn(async move {
                // A panicking source must still release its slot.
                let outcome = AssertUnwindSafe(loader.load(&item.url))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        fallback(loader.inner.sprite_size, "image source panicked".to_string())
                    });
                loader.finish(item, outcome);
            });
        }
    }

    async fn load(&self, url: &str) -> SpriteOutcome {
        let size = self.inner.sprite_size;
        let bytes = match self.inner.source.fetch(url).await {
            Ok(bytes) => bytes,
            Err(reason) => return fallback(size, reason),
        };
        match tokio::task::spawn_blocking(move || sprites::avatar_sprite(&bytes, size)).await {
            Ok(Ok(image)) => SpriteOutcome::Ready(image),
            Ok(Err(reason)) => fallback(size, reason),
            Err(e) => fallback(size, format!("sprite processing failed: {e}")),
        }
    }

    fn finish(&self, item: ImageQueueItem, outcome: SpriteOutcome) {
        if let SpriteOutcome::Fallback { reason, .. } = &outcome {
            warn!(
                url = %item.url,
                sprite = %item.sprite_name,
                reason = %reason,
                "avatar unavailable, using fallback"
            );
        }
        if self
            .inner
            .deliveries
            .send(SpriteDelivery {
                sprite_name: item.sprite_name,
                outcome,
            })
            .is_err()
        {
            debug!("sprite receiver dropped");
        }

        let progress = {
            let mut state = self.lock_state();
            state.active = state.active.saturating_sub(1);
            state.loaded += 1;
            state.progress()
        };
        if progress.is_idle() {
            info!(loaded = progress.loaded, "image queue complete");
        }
        self.pump();
    }
}

fn fallback(size: u32, reason: String) -> SpriteOutcome {
    SpriteOutcome::Fallback {
        image: sprites::fallback_sprite(size),
        reason,
    }
}
