//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Metric names.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "vgen_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vgen_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vgen_http_requests_in_flight";

    // Recorded by the worker crate
    pub const ASSEMBLY_REQUESTS_TOTAL: &str = "vgen_assembly_requests_total";
    pub const ASSEMBLY_DURATION_SECONDS: &str = "vgen_assembly_duration_seconds";
    pub const COMPOSITION_FALLBACKS_TOTAL: &str = "vgen_composition_fallbacks_total";
}

/// Install the global Prometheus recorder and describe the known metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(names::HTTP_REQUESTS_TOTAL, "HTTP requests by method, route and status");
    describe_histogram!(names::HTTP_REQUEST_DURATION_SECONDS, "HTTP request latency");
    describe_gauge!(names::HTTP_REQUESTS_IN_FLIGHT, "HTTP requests being served");
    describe_counter!(names::ASSEMBLY_REQUESTS_TOTAL, "Assembly requests by outcome");
    describe_histogram!(names::ASSEMBLY_DURATION_SECONDS, "End-to-end assembly time");
    describe_counter!(
        names::COMPOSITION_FALLBACKS_TOTAL,
        "Compositions replaced by the avatar clip"
    );

    Ok(handle)
}

/// Route template for labels, so artifact ids never become label values.
fn route_label(matched: Option<&MatchedPath>) -> String {
    matched
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned())
}

/// Count and time every request.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let labels_base = [
        ("method", request.method().to_string()),
        ("route", route_label(request.extensions().get::<MatchedPath>())),
    ];
    let started = Instant::now();
    let in_flight = gauge!(names::HTTP_REQUESTS_IN_FLIGHT);

    in_flight.increment(1.0);
    let response = next.run(request).await;
    in_flight.decrement(1.0);

    let [method, route] = labels_base;
    let labels = [method, route, ("status", response.status().as_u16().to_string())];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels)
        .record(started.elapsed().as_secs_f64());

    response
}
