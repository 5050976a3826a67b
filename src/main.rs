//! Propsearch - property listing search service
//!
//! Serves a read-only property dataset over HTTP with suburb and price
//! filtering, pagination, and optional address geocoding.

use anyhow::Context;
use clap::{Parser, Subcommand};
use propsearch_core::{AppConfig, InMemoryRepository, PropertyRepository};
use propsearch_serve::PropsearchServer;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "propsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Propsearch - read-only property listing search service")]
#[command(long_about = r#"
Propsearch serves a static property dataset over HTTP.

Endpoints:
- GET /properties       search by suburb, price range and page
- GET /properties/:id   full listing including description
- GET /health           liveness probe

Supplying `address` to a search geocodes it through the provider configured
with GEOCODING_API_URL (and optionally GEOCODING_API_KEY).
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (YAML, TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON file with property records (defaults to the bundled dataset)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Load configuration and dataset, then report what would be served
    Check {
        /// JSON file with property records (defaults to the bundled dataset)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    propsearch_core::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Some(Commands::Serve { host, port, data }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if data.is_some() {
                config.data.properties_path = data;
            }
            handle_serve(config).await?;
        }
        Some(Commands::Check { data }) => {
            if data.is_some() {
                config.data.properties_path = data;
            }
            handle_check(&config)?;
        }
        Some(Commands::Version) => {
            println!("{}", propsearch_core::version_info());
            println!("propsearch-serve v{}", propsearch_serve::VERSION);
        }
        None => {
            handle_serve(config).await?;
        }
    }

    Ok(())
}

async fn handle_serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    info!("Starting propsearch v{}", env!("CARGO_PKG_VERSION"));
    let server = PropsearchServer::new(config).context("Failed to initialize server")?;
    server.start().await.context("Server terminated with an error")?;

    Ok(())
}

fn handle_check(config: &AppConfig) -> anyhow::Result<()> {
    let source = config
        .data
        .properties_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled dataset".to_string());

    let repository = InMemoryRepository::load(config.data.properties_path.as_deref())
        .with_context(|| format!("Failed to load properties from {}", source))?;

    println!("Dataset:     {} ({} properties)", source, repository.len());
    println!("Page size:   {}", config.search.page_size);
    println!(
        "Geocoding:   {}",
        config.geocoding.endpoint().unwrap_or("not configured")
    );
    println!(
        "API key:     {}",
        if config.geocoding.key().is_some() { "set" } else { "not set" }
    );
    println!("Listen on:   {}:{}", config.server.host, config.server.port);

    Ok(())
}
