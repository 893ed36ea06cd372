use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reading_map_shared::{ReadingsResponse, StatsResponse, UsersResponse};
use tracing::warn;

use crate::config::DEFAULT_IMAGE_MAX_RETRIES;
use crate::fetch::{FetchError, ResilientFetchClient, RetryPolicy};

/// Typed access to the dashboard backend.
pub struct ApiClient {
    fetch: Arc<ResilientFetchClient>,
    base_url: String,
    proxy_url: String,
}

impl ApiClient {
    pub fn new(fetch: Arc<ResilientFetchClient>, base_url: &str, proxy_url: &str) -> Self {
        Self {
            fetch,
            base_url: base_url.trim_end_matches('/').to_string(),
            proxy_url: proxy_url.to_string(),
        }
    }

    pub fn stats_url(&self) -> String {
        format!("{}/stats", self.base_url)
    }

    pub fn users_url(&self) -> String {
        format!("{}/users/locations", self.base_url)
    }

    pub fn readings_url(&self, iso3: &str) -> String {
        format!("{}/readings/{}", self.base_url, normalize_iso3(iso3))
    }

    pub async fn fetch_stats(&self) -> Result<StatsResponse, FetchError> {
        self.fetch.fetch_json(&self.stats_url()).await
    }

    pub async fn fetch_user_locations(&self) -> Result<UsersResponse, FetchError> {
        self.fetch.fetch_json(&self.users_url()).await
    }

    pub async fn fetch_readings(&self, iso3: &str) -> Result<ReadingsResponse, FetchError> {
        self.fetch.fetch_json(&self.readings_url(iso3)).await
    }

    /// Route a remote image through the CORS proxy. URLs already pointing at
    /// the proxy, and inline `data:` URLs, are returned as-is.
    pub fn proxied_image_url(&self, url: &str) -> String {
        if url.starts_with("data:") || url.starts_with(&self.proxy_url) {
            return url.to_string();
        }
        match reqwest::Url::parse_with_params(&self.proxy_url, &[("url", url)]) {
            Ok(proxied) => proxied.to_string(),
            Err(e) => {
                warn!(
                    proxy_url = %self.proxy_url,
                    error = %e,
                    "invalid proxy url, fetching image directly"
                );
                url.to_string()
            }
        }
    }

    /// Images use a smaller retry budget than data endpoints; a failed avatar
    /// falls back to a placeholder anyway.
    pub async fn fetch_image(&self, url: &str) -> Result<Bytes, FetchError> {
        let base = self.fetch.policy();
        let policy = RetryPolicy {
            max_retries: DEFAULT_IMAGE_MAX_RETRIES.min(base.max_retries),
            max_rate_limit_retries: 1,
            base_delay: base.base_delay.min(Duration::from_millis(500)),
            ..*base
        };
        self.fetch
            .fetch_bytes_with(&self.proxied_image_url(url), &policy)
            .await
    }
}

fn normalize_iso3(iso3: &str) -> String {
    iso3.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpTransport;
    use crate::test_support::{Reply, ScriptedTransport};

    fn api(transport: Arc<ScriptedTransport>) -> ApiClient {
        let fetch = Arc::new(ResilientFetchClient::new(
            transport,
            None,
            RetryPolicy {
                max_retries: 0,
                ..RetryPolicy::default()
            },
        ));
        ApiClient::new(fetch, "http://api.test/api/", "http://api.test/api/proxy")
    }

    #[test]
    fn endpoint_urls() {
        let api = api(Arc::new(ScriptedTransport::default()));
        assert_eq!(api.stats_url(), "http://api.test/api/stats");
        assert_eq!(api.users_url(), "http://api.test/api/users/locations");
        assert_eq!(api.readings_url(" bra "), "http://api.test/api/readings/BRA");
    }

    #[test]
    fn proxied_urls_encode_the_target() {
        let api = api(Arc::new(ScriptedTransport::default()));
        assert_eq!(
            api.proxied_image_url("https://img.example/a b.png?x=1&y=2"),
            "http://api.test/api/proxy?url=https%3A%2F%2Fimg.example%2Fa+b.png%3Fx%3D1%26y%3D2"
        );
        let already = "http://api.test/api/proxy?url=abc";
        assert_eq!(api.proxied_image_url(already), already);
        let inline = "data:image/png;base64,AAAA";
        assert_eq!(api.proxied_image_url(inline), inline);
    }

    #[tokio::test]
    async fn readings_are_decoded() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.push(
            "http://api.test/api/readings/PRT",
            Reply::json(
                r#"{"readings":[{"user":"ana","avatarURL":"","capaURL":"https://c/1.jpg",
                    "livro":"Os Maias","progresso":40}]}"#,
            ),
        );
        let api = api(Arc::clone(&transport));

        let readings = api.fetch_readings("prt").await.expect("readings decode");
        assert_eq!(readings.readings.len(), 1);
        let reading = &readings.readings[0];
        assert_eq!(reading.user, "ana");
        assert_eq!(reading.avatar(), None);
        assert_eq!(reading.cover(), Some("https://c/1.jpg"));
        assert_eq!(reading.progress, 40);
    }

    #[tokio::test(start_paused = true)]
    async fn images_go_through_the_proxy_with_a_short_budget() {
        let transport = Arc::new(ScriptedTransport::default());
        let proxied = "http://api.test/api/proxy?url=https%3A%2F%2Fimg.example%2Fana.png";
        transport.push(proxied, Reply::status(502, "bad gateway"));
        transport.push(proxied, Reply::bytes(vec![0x89, b'P', b'N', b'G']));
        let gone = "http://api.test/api/proxy?url=https%3A%2F%2Fimg.example%2Fgone.png";
        transport.always(gone, Reply::status(404, "missing"));
        let fetch = Arc::new(ResilientFetchClient::new(
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
            None,
            RetryPolicy::default(),
        ));
        let api = ApiClient::new(fetch, "http://api.test/api", "http://api.test/api/proxy");

        let bytes = api
            .fetch_image("https://img.example/ana.png")
            .await
            .expect("second attempt succeeds");
        assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
        assert_eq!(transport.call_gaps(proxied), [Duration::from_millis(500)]);

        assert!(api.fetch_image("https://img.example/gone.png").await.is_err());
        assert_eq!(transport.call_count(gone), 2);
    }
}
