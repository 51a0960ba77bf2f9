use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified application error.
///
/// This ensures all layers (config, network, parsing, product file IO)
/// fail in a predictable and debuggable way.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid server configuration, e.g. the gold API key.
    #[error("Config error: {0}")]
    Config(String),

    /// The external gold price source is unreachable and no cached
    /// value exists to fall back on.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Malformed upstream response or malformed static product data.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The static product file could not be read.
    #[error("IO error: {0}")]
    Io(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Fetch(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable: could not retrieve gold price.",
            ),
            AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error.")
            }
            AppError::Parse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Malformed price or product data.",
            ),
            AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not read product data file.",
            ),
        };
        let body = json!({ "error": error, "details": self.to_string() });
        (status, Json(body)).into_response()
    }
}
