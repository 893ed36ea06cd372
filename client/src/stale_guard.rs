use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::debug;

pub type KeyedFetch<K, R> = Arc<dyn Fn(K) -> BoxFuture<'static, R> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardStats {
    pub issued: u64,
    pub applied: u64,
    pub discarded: u64,
}

/// Issues keyed fetches and only lets through the result for the key that is
/// current when it arrives. Results come back over the channel returned by
/// [`StaleGuardedCoordinator::new`] and must be passed to
/// [`StaleGuardedCoordinator::on_result`].
pub struct StaleGuardedCoordinator<K, R> {
    current: Option<K>,
    fetch: KeyedFetch<K, R>,
    results: mpsc::UnboundedSender<(K, R)>,
    stats: GuardStats,
}

impl<K, R> StaleGuardedCoordinator<K, R>
where
    K: Clone + Debug + PartialEq + Send + 'static,
    R: Send + 'static,
{
    pub fn new(fetch: KeyedFetch<K, R>) -> (Self, mpsc::UnboundedReceiver<(K, R)>) {
        let (results, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            current: None,
            fetch,
            results,
            stats: GuardStats::default(),
        };
        (coordinator, rx)
    }

    pub fn request(&mut self, key: K) {
        self.current = Some(key.clone());
        self.stats.issued += 1;
        let fetch = Arc::clone(&self.fetch);
        let results = self.results.clone();
        tokio::spawn(async move {
            let result = fetch(key.clone()).await;
            let _ = results.send((key, result));
        });
    }

    /// `Some(result)` if `key` is still current, otherwise the result is dropped.
    pub fn on_result(&mut self, key: K, result: R) -> Option<R> {
        if self.current.as_ref() == Some(&key) {
            self.stats.applied += 1;
            Some(result)
        } else {
            self.stats.discarded += 1;
            debug!(key = ?key, current = ?self.current, "stale result ignored");
            None
        }
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    pub fn stats(&self) -> GuardStats {
        self.stats
    }
}
