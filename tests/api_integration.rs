//! Integration tests for all API endpoints.
//!
//! Each test boots the full Axum router (same assembly as `main.rs`)
//! using `tower::ServiceExt::oneshot` — no live server or live gold
//! API needed.
//!
//! `build_test_app()` wires together:
//! - A wiremocked gold quote endpoint used by the real `GoldApiClient`
//! - The single-slot gold price cache
//! - The static products fixture under `tests/fixtures/`
//! - Prometheus `AppMetrics`
//! - The complete `Router` returned ready for `oneshot`

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gold_catalog::{
    api,
    api::products::ProductsApiState,
    cache::TtlCache,
    metrics::AppMetrics,
    services::goldapi::GoldApiClient,
};

// ---- Helpers ----------------------------------------------------------------

const API_KEY: &str = "integration-test-key";

/// 1866.21 USD per troy ounce ÷ 31.1035 = exactly 60 USD per gram.
const QUOTE_PER_OUNCE: f64 = 1866.21;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/products.json")
}

/// Stub the gold quote endpoint with a successful response.
async fn mount_quote(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/XAU/USD"))
        .and(header("x-access-token", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metal": "XAU",
            "currency": "USD",
            "price": QUOTE_PER_OUNCE
        })))
        .mount(server)
        .await;
}

/// Build the complete test router backed by a wiremocked gold API.
///
/// The `MockServer` must stay alive for the duration of the test
/// because `GoldApiClient` holds its URL.
async fn build_test_app(cache_ttl: Duration) -> (Router, MockServer, Arc<AppMetrics>) {
    let mock_server = MockServer::start().await;

    let client = GoldApiClient::new(
        format!("{}/api/XAU/USD", mock_server.uri()),
        API_KEY.to_string(),
    );
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let state = Arc::new(ProductsApiState {
        price_provider: Arc::new(client),
        price_cache: Arc::new(Mutex::new(TtlCache::new(cache_ttl))),
        products_file: fixture_path(),
        metrics: metrics.clone(),
    });

    (api::router(state, metrics.clone()), mock_server, metrics)
}

/// Convenience: collect body bytes and parse as JSON.
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, json_body(resp.into_body()).await)
}

fn price_of(items: &Value, name: &str) -> f64 {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == name)
        .unwrap_or_else(|| panic!("missing product: {}", name))["price"]
        .as_f64()
        .unwrap_or_else(|| panic!("product {} has no price", name))
}

// ---- GET /health ------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_with_ok_body() {
    let (app, _mock, _) = build_test_app(Duration::from_secs(60)).await;
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

// ---- GET /api/products ------------------------------------------------------

#[tokio::test]
async fn products_returns_200_with_required_fields() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (status, json) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);

    let items = json.as_array().expect("response should be a JSON array");
    assert_eq!(items.len(), 7);

    let ring = items
        .iter()
        .find(|item| item["name"] == "Engagement Ring")
        .unwrap();
    assert!(ring["popularityScore"].is_number());
    assert!(ring["weight"].is_number());
    assert!(ring["images"].is_object());
    assert!(ring["price"].is_number());
}

#[tokio::test]
async fn products_prices_derive_from_the_ounce_quote() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (_, json) = get(&app, "/api/products").await;
    // (0.8 + 1) × 5g × 60 USD/g
    assert_eq!(price_of(&json, "Engagement Ring"), 540.0);
    // (0.5 + 1) × 2g × 60 USD/g
    assert_eq!(price_of(&json, "Aurora Band"), 180.0);
}

#[tokio::test]
async fn second_request_within_ttl_makes_no_upstream_call() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    Mock::given(method("GET"))
        .and(path("/api/XAU/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": QUOTE_PER_OUNCE })))
        .expect(1)
        .mount(&mock)
        .await;

    let (first_status, first) = get(&app, "/api/products").await;
    let (second_status, second) = get(&app, "/api/products").await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(
        price_of(&first, "Engagement Ring"),
        price_of(&second, "Engagement Ring")
    );
    // `.expect(1)` on the mock verifies exactly one upstream call on drop.
}

#[tokio::test]
async fn stale_price_is_served_when_the_refresh_fails() {
    let (app, mock, metrics) = build_test_app(Duration::from_millis(40)).await;

    // First call succeeds, everything after that fails.
    Mock::given(method("GET"))
        .and(path("/api/XAU/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": QUOTE_PER_OUNCE })))
        .up_to_n_times(1)
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/XAU/USD"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;

    let (status, first) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let (status, second) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::OK, "stale fallback should keep serving");
    assert_eq!(
        price_of(&first, "Engagement Ring"),
        price_of(&second, "Engagement Ring")
    );
    assert!((metrics.stale_price_served_total.get() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn upstream_failure_with_empty_cache_returns_503() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;

    let (status, json) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].is_string());
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn malformed_upstream_body_with_empty_cache_returns_503() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "price": "not-a-number" })))
        .mount(&mock)
        .await;

    let (status, _) = get(&app, "/api/products").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn price_filter_bounds_are_inclusive() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (status, json) = get(&app, "/api/products?minPrice=180&maxPrice=540").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Engagement Ring"));
    assert!(names.contains(&"Aurora Band"));
    assert!(names.contains(&"Vintage Locket"));
}

#[tokio::test]
async fn negative_popularity_bound_is_clamped_to_zero() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (_, clamped) = get(&app, "/api/products?minPopularity=-0.5").await;
    let (_, zero) = get(&app, "/api/products?minPopularity=0").await;
    assert_eq!(clamped, zero);
}

#[tokio::test]
async fn unparsable_filter_values_are_ignored() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (status, json) = get(&app, "/api/products?minPrice=cheap&maxRating=oops").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn sort_price_asc_places_unpriced_records_last() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (_, json) = get(&app, "/api/products?sort=price-asc").await;
    let items = json.as_array().unwrap();

    assert_eq!(items[0]["name"], "Pearl Halo"); // 114.00, cheapest
    assert!(items[5]["price"].is_null());
    assert!(items[6]["price"].is_null());
}

#[tokio::test]
async fn sort_name_asc_orders_lexicographically() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    let (_, json) = get(&app, "/api/products?sort=name-asc").await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

// ---- GET /metrics -----------------------------------------------------------

#[tokio::test]
async fn metrics_returns_prometheus_text_with_service_counters() {
    let (app, mock, _) = build_test_app(Duration::from_secs(60)).await;
    mount_quote(&mock).await;

    // Generate a fetch and a cache hit first.
    let (_, _) = get(&app, "/api/products").await;
    let (_, _) = get(&app, "/api/products").await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
        .headers()
        .get("content-type")
        .expect("missing content-type header")
        .to_str()
        .unwrap();
    assert_eq!(ct, "text/plain; version=0.0.4");

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("gold_catalog_price_fetches_total 1"));
    assert!(body.contains("gold_catalog_price_cache_hits_total 1"));
    assert!(body.contains("gold_catalog_http_requests_total"));
}
