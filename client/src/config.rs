use std::time::Duration;

use reading_map_shared::RingLayout;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const API_KEY_HEADER: &str = "X-API-Key";

pub const DEFAULT_STATS_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_USERS_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_POLL_DEDUPE_WINDOW_SECS: u64 = 10;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_FETCH_MAX_RETRIES: u32 = 3;
pub const DEFAULT_FETCH_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 5;
pub const DEFAULT_IMAGE_MAX_RETRIES: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

/// Side length of avatar sprites, in pixels.
pub const SPRITE_SIZE: u32 = 48;

/// Everything the sync engine needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub proxy_url: String,
    pub stats_poll_interval: Duration,
    pub users_poll_interval: Duration,
    pub dedupe_window: Duration,
    pub fetch_timeout: Duration,
    pub fetch_max_retries: u32,
    pub fetch_base_delay: Duration,
    pub image_concurrency: usize,
    pub pause_stats_when_unfocused: bool,
    pub ring_layout: RingLayout,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let api_url = api_url();
        let proxy_url = proxy_url(&api_url);
        Self {
            api_key: api_key(),
            proxy_url,
            api_url,
            stats_poll_interval: secs_var(
                "STATS_POLL_INTERVAL_SECS",
                DEFAULT_STATS_POLL_INTERVAL_SECS,
            ),
            users_poll_interval: secs_var(
                "USERS_POLL_INTERVAL_SECS",
                DEFAULT_USERS_POLL_INTERVAL_SECS,
            ),
            dedupe_window: secs_var("POLL_DEDUPE_WINDOW_SECS", DEFAULT_POLL_DEDUPE_WINDOW_SECS),
            fetch_timeout: millis_var("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS),
            fetch_max_retries: fetch_max_retries(),
            fetch_base_delay: millis_var("FETCH_BASE_DELAY_MS", DEFAULT_FETCH_BASE_DELAY_MS),
            image_concurrency: image_concurrency(),
            pause_stats_when_unfocused: flag_var("PAUSE_STATS_WHEN_UNFOCUSED", true),
            ring_layout: RingLayout::default(),
        }
    }
}

pub fn api_url() -> String {
    std::env::var("READING_MAP_API_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

pub fn api_key() -> Option<String> {
    std::env::var("READING_MAP_API_KEY")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn proxy_url(api_url: &str) -> String {
    std::env::var("READING_MAP_PROXY_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("{api_url}/proxy"))
}

pub fn fetch_max_retries() -> u32 {
    std::env::var("FETCH_MAX_RETRIES")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(DEFAULT_FETCH_MAX_RETRIES)
}

pub fn image_concurrency() -> usize {
    std::env::var("IMAGE_CONCURRENCY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_IMAGE_CONCURRENCY)
}

fn secs_var(name: &str, default: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

fn millis_var(name: &str, default: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default))
}

fn flag_var(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(default)
}
