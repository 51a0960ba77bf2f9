//! `GET /api/products` — priced, filtered product listing.
//!
//! Per request: resolve the gold price per gram (cache, fetch, or stale
//! fallback), read the static product file, compute per-product prices,
//! apply the optional range filters, and apply the optional sort.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::cache::TtlCache;
use crate::error::AppError;
use crate::metrics::AppMetrics;
use crate::pricing::{apply_filters, compute_prices, sort_products, FilterCriteria, SortMode};
use crate::products::load_products;
use crate::services::goldapi::GoldApiClient;

/// Shared state type for the products route.
pub type ProductsState = Arc<ProductsApiState>;

/// Source of the current gold price per gram.
#[async_trait]
pub trait SpotPriceProvider {
    async fn price_per_gram(&self) -> Result<f64, AppError>;
}

#[async_trait]
impl SpotPriceProvider for GoldApiClient {
    async fn price_per_gram(&self) -> Result<f64, AppError> {
        self.fetch_price_per_gram().await
    }
}

pub struct ProductsApiState {
    pub price_provider: Arc<dyn SpotPriceProvider + Send + Sync>,
    pub price_cache: Arc<Mutex<TtlCache<f64>>>,
    pub products_file: PathBuf,
    pub metrics: Arc<AppMetrics>,
}

/// Resolved gold price plus whether it was served past its TTL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrice {
    pub per_gram: f64,
    pub stale: bool,
}

/// Resolve the gold price per gram through the cache.
///
/// A fresh cache entry is served without any external call. An expired
/// or empty slot triggers a fetch; when the fetch fails and a previous
/// value exists, the previous value is served instead of failing the
/// request. A fetch failure with an empty slot surfaces as `Fetch`
/// (service unavailable), except for configuration errors which pass
/// through unchanged.
pub async fn resolve_unit_price(state: &ProductsApiState) -> Result<UnitPrice, AppError> {
    {
        let cache = state.price_cache.lock().await;
        if let Some(price) = cache.get() {
            tracing::debug!(price_per_gram = price, "using cached gold price");
            state.metrics.price_cache_hits_total.inc();
            return Ok(UnitPrice {
                per_gram: price,
                stale: false,
            });
        }
    }

    state.metrics.price_fetches_total.inc();
    match state.price_provider.price_per_gram().await {
        Ok(fresh) => {
            let mut cache = state.price_cache.lock().await;
            cache.set(fresh);
            Ok(UnitPrice {
                per_gram: fresh,
                stale: false,
            })
        }
        Err(err) => {
            state.metrics.price_fetch_errors_total.inc();
            let cache = state.price_cache.lock().await;
            match cache.get_stale() {
                Some(previous) => {
                    let age_seconds = cache.age().map(|age| age.as_secs()).unwrap_or(0);
                    tracing::warn!(
                        %err,
                        age_seconds,
                        "gold price fetch failed; serving stale cached value"
                    );
                    state.metrics.stale_price_served_total.inc();
                    Ok(UnitPrice {
                        per_gram: previous,
                        stale: true,
                    })
                }
                None => {
                    tracing::error!(%err, "gold price fetch failed with empty cache");
                    match err {
                        AppError::Config(_) => Err(err),
                        other => Err(AppError::Fetch(other.to_string())),
                    }
                }
            }
        }
    }
}

/// Raw query parameters. Numeric parsing is lenient: malformed values
/// act as absent bounds rather than request errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_popularity: Option<String>,
    pub max_popularity: Option<String>,
    pub sort: Option<String>,
}

pub async fn list_products(
    State(state): State<ProductsState>,
    Query(params): Query<ProductsQuery>,
) -> Result<Response, AppError> {
    let unit_price = resolve_unit_price(&state).await?;
    let products = load_products(&state.products_file).await?;

    let criteria = FilterCriteria::from_raw(
        params.min_price.as_deref(),
        params.max_price.as_deref(),
        params.min_popularity.as_deref(),
        params.max_popularity.as_deref(),
    );
    let sort = SortMode::from_query(params.sort.as_deref());

    let priced = compute_prices(&products, unit_price.per_gram);
    let mut filtered = apply_filters(priced, &criteria);
    sort_products(&mut filtered, sort);

    tracing::info!(
        returned = filtered.len(),
        stale_price = unit_price.stale,
        "serving product list"
    );

    let mut response = Json(filtered).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, max-age=0"),
    );
    Ok(response)
}
