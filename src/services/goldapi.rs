//! Client for the external gold quote API.
//!
//! The upstream endpoint returns a JSON body with a numeric `price`
//! field denominated in USD per troy ounce, authenticated through the
//! `x-access-token` header. The client converts to USD per gram before
//! handing the value to callers.

use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;

/// Grams per troy ounce; the upstream quote is per ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

#[derive(Clone)]
pub struct GoldApiClient {
    url: String,
    api_key: String,
    http: Client,
}

impl GoldApiClient {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            url,
            api_key,
            http: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current spot quote and convert it to USD per gram.
    ///
    /// An unset key fails before any network call is made.
    pub async fn fetch_price_per_gram(&self) -> Result<f64, AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "GOLD_API_KEY is not configured".to_string(),
            ));
        }

        let response = self
            .http
            .get(&self.url)
            .header("x-access-token", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Fetch(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "gold API returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))?;

        let price_per_ounce = body
            .get("price")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                AppError::Parse("gold API response missing numeric price field".to_string())
            })?;

        let price_per_gram = price_per_ounce / GRAMS_PER_TROY_OUNCE;
        tracing::info!(price_per_gram, "fetched fresh gold price");
        Ok(price_per_gram)
    }
}
