//! Command-line argument parsing for the HSE catalog client
//!
//! This module defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// HSE Catalog - browse categories and search products
#[derive(Parser, Debug)]
#[command(
    name = "hse_catalog",
    version,
    about = "Browse the HSE shop catalog from the command line",
    long_about = "Lists the category tree of the HSE shop and runs paginated product searches \
inside a category, loading further pages on demand."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the category tree
    Categories(CategoriesArgs),

    /// Search products inside a category
    Search(SearchArgs),

    /// Write a default configuration file
    InitConfig,
}

/// Arguments for the categories command
#[derive(Args, Debug, Clone)]
pub struct CategoriesArgs {
    /// Maximum depth to print (1 = top level only)
    #[arg(short, long)]
    pub depth: Option<usize>,
}

/// Arguments for the search command
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Category path, display names joined with '/' (e.g. "Kochen/Töpfe")
    #[arg(value_name = "CATEGORY_PATH")]
    pub category: String,

    /// Search query (empty matches everything)
    #[arg(long, default_value = "")]
    pub query: String,

    /// Number of pages to load
    #[arg(short, long, default_value = "1")]
    pub pages: u32,

    /// Page size; the server default applies when unset
    #[arg(long)]
    pub hits_per_page: Option<u32>,

    /// Check the category path against the category tree first
    #[arg(long)]
    pub validate_path: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl SearchArgs {
    /// Check argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("Category path must not be empty".to_string());
        }

        if self.pages == 0 {
            return Err("Number of pages must be greater than 0".to_string());
        }

        if self.hits_per_page == Some(0) {
            return Err("Page size must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_args() -> SearchArgs {
        SearchArgs {
            category: "Kochen".to_string(),
            query: String::new(),
            pages: 1,
            hits_per_page: None,
            validate_path: false,
        }
    }

    #[test]
    fn test_search_args_validation() {
        let mut args = search_args();
        assert!(args.validate().is_ok());

        args.pages = 0;
        assert!(args.validate().is_err());

        let args = SearchArgs {
            hits_per_page: Some(0),
            ..search_args()
        };
        assert!(args.validate().is_err());

        let args = SearchArgs {
            category: "  ".to_string(),
            ..search_args()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from([
            "hse_catalog",
            "-v",
            "search",
            "Kochen/Töpfe",
            "--query",
            "Bräter",
            "--pages",
            "3",
            "--hits-per-page",
            "12",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.category, "Kochen/Töpfe");
                assert_eq!(args.query, "Bräter");
                assert_eq!(args.pages, 3);
                assert_eq!(args.hits_per_page, Some(12));
            }
            other => panic!("Expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli::try_parse_from(["hse_catalog", "-q", "init-config"]).unwrap();
        let cli_verbose = Cli::try_parse_from(["hse_catalog", "categories", "-v"]).unwrap();
        let cli_default = Cli::try_parse_from(["hse_catalog", "categories"]).unwrap();

        assert_eq!(cli_quiet.log_level(), tracing::Level::ERROR);
        assert_eq!(cli_verbose.log_level(), tracing::Level::INFO);
        assert_eq!(cli_default.log_level(), tracing::Level::WARN);
    }
}
