//! HTTP surface: route assembly and handlers.

pub mod health;
pub mod products;

use std::sync::Arc;

use axum::{body::Body, http::header, middleware, response::Response, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::metrics::{track_http, AppMetrics};

/// Assemble the full application router. Used by `main.rs` and by the
/// integration tests so both exercise the same wiring.
pub fn router(state: products::ProductsState, metrics: Arc<AppMetrics>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let metrics_for_handler = metrics.clone();

    let products_router = Router::new()
        .route("/api/products", get(products::list_products))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/metrics",
            get(move || {
                let m = metrics_for_handler.clone();
                async move {
                    match m.render() {
                        Ok(body) => Response::builder()
                            .status(200)
                            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                            .body(Body::from(body))
                            .expect("metrics response should be valid"),
                        Err(err) => {
                            tracing::error!("failed to render metrics: {}", err);
                            Response::builder()
                                .status(500)
                                .body(Body::from("metrics error"))
                                .expect("metrics error response should be valid")
                        }
                    }
                }
            }),
        )
        .merge(products_router)
        .layer(middleware::from_fn_with_state(metrics, track_http))
        .layer(cors)
}
