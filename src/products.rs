//! Static product catalog loading.
//!
//! The catalog lives in a JSON file on disk (`products.json` by
//! default) and is re-read on every request so edits show up without a
//! restart. The two numeric fields are deserialized leniently: a record
//! carrying a string or null where a number is expected yields `None`
//! for that field instead of failing the whole file. Pricing later
//! flags such records individually.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// One record from the static products file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub name: String,
    /// Normalized desirability metric in [0, 1].
    #[serde(default, deserialize_with = "lenient_f64")]
    pub popularity_score: Option<f64>,
    /// Mass in grams; must be positive for pricing.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight: Option<f64>,
    /// Color name → image URL.
    #[serde(default)]
    pub images: HashMap<String, String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Read and parse the products file.
pub async fn load_products(path: &Path) -> Result<Vec<Product>, AppError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AppError::Io(format!("failed to read {}: {}", path.display(), err)))?;

    serde_json::from_str(&raw)
        .map_err(|err| AppError::Parse(format!("malformed products file: {}", err)))
}
