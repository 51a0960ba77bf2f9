use std::path::PathBuf;

use clap::Parser;

/// Gold catalog CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "gold-catalog",
    version,
    about = "Product catalog API with prices derived from the live gold quote"
)]
pub struct Cli {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Gold price API URL
    #[arg(long)]
    pub gold_api_url: Option<String>,

    /// Path to the static products JSON file
    #[arg(long)]
    pub products_file: Option<PathBuf>,

    /// Gold price cache TTL in seconds
    #[arg(long)]
    pub cache_ttl_seconds: Option<u64>,
}
