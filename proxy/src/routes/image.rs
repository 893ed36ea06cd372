use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_IMAGE_CONTENT_TYPE, IMAGE_CACHE_CONTROL};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    #[serde(default)]
    pub url: Option<String>,
}

/// Fetch an external image and relay it from our own origin.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    let Some(raw) = query.url.as_deref().map(str::trim).filter(|url| !url.is_empty()) else {
        state.stats.record_rejected();
        return error_response(StatusCode::BAD_REQUEST, "Missing url parameter");
    };
    let Some(target) = parse_target(raw) else {
        state.stats.record_rejected();
        return error_response(StatusCode::BAD_REQUEST, "Invalid url parameter");
    };

    let resp = match state.http_client.get(target.clone()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url = %target, error = %e, "image fetch failed");
            state.stats.record_upstream_error();
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch image");
        }
    };

    let status = resp.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("upstream error");
        debug!(url = %target, status = status.as_u16(), "upstream rejected image request");
        state.stats.record_upstream_error();
        let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return error_response(status, &format!("Failed to fetch image: {reason}"));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
        .to_string();

    match resp.bytes().await {
        Ok(body) => {
            state.stats.record_proxied();
            image_response(body, &content_type)
        }
        Err(e) => {
            warn!(url = %target, error = %e, "failed to read image body");
            state.stats.record_upstream_error();
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch image")
        }
    }
}

/// Only absolute http(s) URLs with a host are proxied.
fn parse_target(raw: &str) -> Option<reqwest::Url> {
    let url = reqwest::Url::parse(raw).ok()?;
    let allowed_scheme = matches!(url.scheme(), "http" | "https");
    (allowed_scheme && url.host_str().is_some_and(|host| !host.is_empty())).then_some(url)
}

fn image_response(body: Bytes, content_type: &str) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_IMAGE_CONTENT_TYPE)),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(IMAGE_CACHE_CONTROL));
    response
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
