//! Prometheus metrics registry for the gold catalog service.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the API state and HTTP middleware.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Total number of gold price fetch attempts (success + failure).
    pub price_fetches_total: Counter,
    /// Total number of failed gold price fetch attempts.
    pub price_fetch_errors_total: Counter,
    /// Requests served from a fresh cached gold price.
    pub price_cache_hits_total: Counter,
    /// Requests served from a stale cached gold price after a failed fetch.
    pub stale_price_served_total: Counter,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let price_fetches_total = Counter::with_opts(Opts::new(
            "gold_catalog_price_fetches_total",
            "Total gold price fetch attempts",
        ))?;

        let price_fetch_errors_total = Counter::with_opts(Opts::new(
            "gold_catalog_price_fetch_errors_total",
            "Failed gold price fetch attempts",
        ))?;

        let price_cache_hits_total = Counter::with_opts(Opts::new(
            "gold_catalog_price_cache_hits_total",
            "Requests served from a fresh cached gold price",
        ))?;

        let stale_price_served_total = Counter::with_opts(Opts::new(
            "gold_catalog_stale_price_served_total",
            "Requests served from a stale cached gold price",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "gold_catalog_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gold_catalog_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(price_fetches_total.clone()))?;
        registry.register(Box::new(price_fetch_errors_total.clone()))?;
        registry.register(Box::new(price_cache_hits_total.clone()))?;
        registry.register(Box::new(stale_price_served_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            price_fetches_total,
            price_fetch_errors_total,
            price_cache_hits_total,
            stale_price_served_total,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

/// Axum middleware recording request counts and latency.
pub async fn track_http(
    State(metrics): State<Arc<AppMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    metrics
        .http_requests_total
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();
    metrics
        .http_request_duration
        .observe(started.elapsed().as_secs_f64());
    response
}
