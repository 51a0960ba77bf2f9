//! Price computation, filtering, and sorting over the product catalog.
//!
//! Prices are derived per request: `(popularityScore + 1) × weight ×
//! unit_price`, rounded to two decimals. A record with a missing or
//! non-positive weight, or a missing popularity score, is flagged with
//! an error marker instead of failing the batch.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::products::Product;

/// A product augmented with its computed price, or an invalidity
/// marker when the inputs do not support pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    pub name: String,
    pub popularity_score: Option<f64>,
    pub weight: Option<f64>,
    pub images: HashMap<String, String>,
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive a price for every product against the current gold price per
/// gram. One malformed record never fails the whole batch.
pub fn compute_prices(products: &[Product], unit_price: f64) -> Vec<PricedProduct> {
    products
        .iter()
        .map(|product| {
            let (price, error) = match (product.popularity_score, product.weight) {
                (Some(score), Some(weight)) if weight > 0.0 => {
                    (Some(round2((score + 1.0) * weight * unit_price)), None)
                }
                _ => {
                    tracing::warn!(
                        name = %product.name,
                        "skipping price computation: invalid popularityScore/weight"
                    );
                    (
                        None,
                        Some("Invalid or missing data (popularityScore/weight)".to_string()),
                    )
                }
            };
            PricedProduct {
                name: product.name.clone(),
                popularity_score: product.popularity_score,
                weight: product.weight,
                images: product.images.clone(),
                price,
                error,
            }
        })
        .collect()
}

/// Range bounds parsed from the request query.
///
/// Each bound is independently optional. Popularity bounds are clamped
/// into [0, 1] at construction; unparsable values count as absent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_popularity: Option<f64>,
    pub max_popularity: Option<f64>,
}

impl FilterCriteria {
    pub fn from_raw(
        min_price: Option<&str>,
        max_price: Option<&str>,
        min_popularity: Option<&str>,
        max_popularity: Option<&str>,
    ) -> Self {
        Self {
            min_price: parse_bound(min_price),
            max_price: parse_bound(max_price),
            min_popularity: parse_bound(min_popularity).map(clamp_unit),
            max_popularity: parse_bound(max_popularity).map(clamp_unit),
        }
    }

    pub fn has_price_bound(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    pub fn has_popularity_bound(&self) -> bool {
        self.min_popularity.is_some() || self.max_popularity.is_some()
    }
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Apply the price filter, then the popularity filter. Each filter only
/// runs when at least one of its bounds was supplied; both bounds are
/// inclusive. Records the active filter cannot evaluate (no price, no
/// numeric popularity score) are dropped by that filter.
pub fn apply_filters(
    products: Vec<PricedProduct>,
    criteria: &FilterCriteria,
) -> Vec<PricedProduct> {
    let mut filtered = products;

    if criteria.has_price_bound() {
        let min = criteria.min_price.unwrap_or(0.0);
        let max = criteria.max_price.unwrap_or(f64::INFINITY);
        filtered.retain(|p| matches!(p.price, Some(price) if price >= min && price <= max));
    }

    if criteria.has_popularity_bound() {
        let min = criteria.min_popularity.unwrap_or(0.0);
        let max = criteria.max_popularity.unwrap_or(1.0);
        filtered
            .retain(|p| matches!(p.popularity_score, Some(score) if score >= min && score <= max));
    }

    filtered
}

/// Sort order for the response. String values mirror the storefront
/// dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Default,
    PriceAscending,
    PriceDescending,
    NameAscending,
}

impl SortMode {
    /// Lenient parse: unrecognized values fall back to `Default`.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("price-asc") => Self::PriceAscending,
            Some("price-desc") => Self::PriceDescending,
            Some("name-asc") => Self::NameAscending,
            _ => Self::Default,
        }
    }
}

/// Sort in place. Unpriced records sort to the end in both price
/// orders; `Default` keeps the catalog order.
pub fn sort_products(products: &mut [PricedProduct], mode: SortMode) {
    match mode {
        SortMode::Default => {}
        SortMode::PriceAscending => products.sort_by(|a, b| {
            let lhs = a.price.unwrap_or(f64::INFINITY);
            let rhs = b.price.unwrap_or(f64::INFINITY);
            lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
        }),
        SortMode::PriceDescending => products.sort_by(|a, b| {
            let lhs = a.price.unwrap_or(f64::NEG_INFINITY);
            let rhs = b.price.unwrap_or(f64::NEG_INFINITY);
            rhs.partial_cmp(&lhs).unwrap_or(Ordering::Equal)
        }),
        SortMode::NameAscending => products.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}
