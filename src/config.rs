use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;

/// Default upstream quote endpoint (USD per troy ounce of gold).
pub const DEFAULT_GOLD_API_URL: &str = "https://www.goldapi.io/api/XAU/USD";

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_PRODUCTS_FILE: &str = "products.json";
const DEFAULT_CACHE_TTL_SECONDS: u64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub gold_api_key: String,
    pub gold_api_url: String,
    pub products_file: PathBuf,
    pub port: u16,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let gold_api_key = env::var("GOLD_API_KEY").map_err(|_| "GOLD_API_KEY is required")?;
        if gold_api_key.trim().is_empty() {
            return Err("GOLD_API_KEY must not be empty".to_string());
        }

        let gold_api_url =
            env::var("GOLD_API_URL").unwrap_or_else(|_| DEFAULT_GOLD_API_URL.to_string());

        let products_file = env::var("PRODUCTS_FILE")
            .unwrap_or_else(|_| DEFAULT_PRODUCTS_FILE.to_string())
            .into();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| "PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let cache_ttl_seconds = match env::var("PRICE_CACHE_TTL_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| "PRICE_CACHE_TTL_SECONDS must be a valid number")?,
            Err(_) => DEFAULT_CACHE_TTL_SECONDS,
        };

        Ok(Self {
            gold_api_key,
            gold_api_url,
            products_file,
            port,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
        })
    }

    /// CLI flags take precedence over environment variables.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(url) = &cli.gold_api_url {
            self.gold_api_url = url.clone();
        }
        if let Some(path) = &cli.products_file {
            self.products_file = path.clone();
        }
        if let Some(seconds) = cli.cache_ttl_seconds {
            self.cache_ttl = Duration::from_secs(seconds);
        }
        self
    }
}
