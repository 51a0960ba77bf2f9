use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::Mutex;

use gold_catalog::api;
use gold_catalog::cache::TtlCache;
use gold_catalog::cli::Cli;
use gold_catalog::config::Config;
use gold_catalog::logging::init_logging;
use gold_catalog::metrics::AppMetrics;
use gold_catalog::services::goldapi::GoldApiClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env()
        .map(|config| config.apply_cli(&cli))
        .unwrap_or_else(|err| {
            tracing::error!("Config error: {}", err);
            std::process::exit(1);
        });

    tracing::info!(
        port = config.port,
        products_file = %config.products_file.display(),
        cache_ttl_seconds = config.cache_ttl.as_secs(),
        "Service starting"
    );

    let metrics = Arc::new(AppMetrics::new().unwrap_or_else(|err| {
        tracing::error!("Failed to register metrics: {}", err);
        std::process::exit(1);
    }));

    let client = GoldApiClient::new(config.gold_api_url.clone(), config.gold_api_key.clone());
    let state = Arc::new(api::products::ProductsApiState {
        price_provider: Arc::new(client),
        price_cache: Arc::new(Mutex::new(TtlCache::new(config.cache_ttl))),
        products_file: config.products_file.clone(),
        metrics: metrics.clone(),
    });

    let app = api::router(state, metrics);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        });

    tracing::info!("Listening on http://{}", addr);
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
        std::process::exit(1);
    }
}
