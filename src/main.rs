//! HSE Catalog CLI application
//!
//! Command-line interface for browsing categories and searching products of
//! the HSE shop catalog.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hse_catalog::cli::{handle_categories, handle_init_config, handle_search, Cli, Commands};
use hse_catalog::config::AppConfig;
use hse_catalog::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Writing the default file must work even when the current one is broken
    if let Commands::InitConfig = cli.command {
        init_logging(&cli, None);
        return handle_init_config().await;
    }

    let config = AppConfig::load(cli.global.config.clone()).await?;
    init_logging(&cli, Some(&config));

    info!("HSE Catalog v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Categories(args) => {
            info!("Executing categories command");
            handle_categories(args, &config).await
        }
        Commands::Search(args) => {
            info!("Executing search command");
            handle_search(args, &config).await
        }
        Commands::InitConfig => handle_init_config().await,
    }
}

/// Initialize logging from CLI verbosity and the configured level
fn init_logging(cli: &Cli, config: Option<&AppConfig>) {
    // CLI flags win over the configured level when they ask for more output
    let cli_level = cli.log_level();
    let level = match config.and_then(|c| c.logging.level.parse::<tracing::Level>().ok()) {
        Some(configured) if !cli.global.quiet && configured > cli_level => configured,
        _ => cli_level,
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("hse_catalog={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
