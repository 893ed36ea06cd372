use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/proxy", axum::routing::get(routes::image::proxy_image))
        .route("/api/proxy", axum::routing::get(routes::image::proxy_image))
        .route("/health", axum::routing::get(routes::health::health))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
