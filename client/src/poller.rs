//! Periodic refresh of the aggregate stats and user locations.
//!
//! Each resource has its own [`Poller`]. Calls that overlap or land within the
//! dedupe window of a successful fetch share its result instead of hitting the
//! backend again.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reading_map_shared::{StatsResponse, UsersResponse};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::fetch::FetchError;

/// One fetch of a polled resource.
pub type PollFetch<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Stats,
    Users,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stats => "stats",
            Self::Users => "users",
        })
    }
}

#[derive(Debug, Clone)]
pub enum PollUpdate {
    Stats(Arc<StatsResponse>),
    Users(Arc<UsersResponse>),
    Failed { resource: Resource, error: FetchError },
}

struct Cached<T> {
    started: Instant,
    value: Arc<T>,
}

pub struct Poller<T> {
    resource: Resource,
    fetch: PollFetch<T>,
    interval: Duration,
    dedupe_window: Duration,
    last: Mutex<Option<Cached<T>>>,
}

impl Poller<StatsResponse> {
    pub fn stats(api: Arc<ApiClient>, interval: Duration, dedupe_window: Duration) -> Self {
        let fetch: PollFetch<StatsResponse> = Arc::new(move || {
            let api = Arc::clone(&api);
            async move { api.fetch_stats().await }.boxed()
        });
        Self::new(Resource::Stats, fetch, interval, dedupe_window)
    }
}

impl Poller<UsersResponse> {
    pub fn users(api: Arc<ApiClient>, interval: Duration, dedupe_window: Duration) -> Self {
        let fetch: PollFetch<UsersResponse> = Arc::new(move || {
            let api = Arc::clone(&api);
            async move { api.fetch_user_locations().await }.boxed()
        });
        Self::new(Resource::Users, fetch, interval, dedupe_window)
    }
}

impl<T> Poller<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        resource: Resource,
        fetch: PollFetch<T>,
        interval: Duration,
        dedupe_window: Duration,
    ) -> Self {
        Self {
            resource,
            fetch,
            interval,
            dedupe_window,
            last: Mutex::new(None),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Fetch the resource, or reuse the last success if it started within the
    /// dedupe window. The lock is held across the fetch so concurrent callers
    /// wait for the in-flight request rather than issuing their own.
    pub async fn refresh(&self) -> Result<Arc<T>, FetchError> {
        let mut last = self.last.lock().await;
        if let Some(cached) = last.as_ref()
            && cached.started.elapsed() < self.dedupe_window
        {
            debug!(resource = %self.resource, "reusing recent result");
            return Ok(Arc::clone(&cached.value));
        }

        let started = Instant::now();
        let value = Arc::new((self.fetch)().await?);
        *last = Some(Cached {
            started,
            value: Arc::clone(&value),
        });
        Ok(value)
    }

    /// Refresh on every tick and publish the outcome until the receiver goes
    /// away. With a focus channel, ticks are skipped while unfocused and a
    /// refresh runs as soon as focus returns.
    pub async fn run(
        self: Arc<Self>,
        updates: mpsc::Sender<PollUpdate>,
        mut focus: Option<watch::Receiver<bool>>,
        wrap: fn(Arc<T>) -> PollUpdate,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            resource = %self.resource,
            interval_secs = self.interval.as_secs(),
            "poller started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !is_focused(&focus) {
                        debug!(resource = %self.resource, "unfocused, skipping tick");
                        continue;
                    }
                }
                regained = focus_regained(&mut focus) => {
                    if !regained {
                        continue;
                    }
                    debug!(resource = %self.resource, "focus regained, refreshing");
                }
            }

            let update = match self.refresh().await {
                Ok(value) => wrap(value),
                Err(error) => {
                    warn!(resource = %self.resource, error = %error, "poll failed");
                    PollUpdate::Failed {
                        resource: self.resource,
                        error,
                    }
                }
            };
            if updates.send(update).await.is_err() {
                info!(resource = %self.resource, "update receiver closed, poller stopping");
                break;
            }
        }
    }
}

fn is_focused(focus: &Option<watch::Receiver<bool>>) -> bool {
    focus.as_ref().is_none_or(|rx| *rx.borrow())
}

/// Resolves when the focus flag changes; `true` if it became focused. Never
/// resolves without a focus channel.
async fn focus_regained(focus: &mut Option<watch::Receiver<bool>>) -> bool {
    let Some(rx) = focus.as_mut() else {
        return std::future::pending().await;
    };
    match rx.changed().await {
        Ok(()) => *rx.borrow_and_update(),
        Err(_) => {
            *focus = None;
            false
        }
    }
}
