//! API routes.

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers;
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, propagate_request_id, request_logging, security_headers, set_request_id,
};
use crate::state::AppState;

/// Build the application router.
///
/// Everything under `/api` is the public surface; probes and `/metrics` sit at the root.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api = Router::new()
        .route("/generate", post(handlers::generate_video))
        .route("/languages", get(handlers::list_languages))
        .route("/voices", get(handlers::list_voices))
        .route("/avatars", get(handlers::list_avatars))
        .route("/video/:video_id", get(handlers::stream_video))
        .route("/download/:video_id", get(handlers::download_video))
        .route("/audio/:audio_id", get(handlers::stream_audio));

    let mut router = Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    if let Some(handle) = metrics_handle {
        router = router.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    // The last layer sees the request first, so the id exists before anything logs.
    router
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers))
        .layer(from_fn(request_logging))
        .layer(propagate_request_id())
        .layer(set_request_id())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
