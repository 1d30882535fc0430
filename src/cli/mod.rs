//! Command-line interface components
//!
//! This module contains CLI-specific code for the HSE catalog client:
//! argument parsing and the command handlers.

pub mod args;
pub mod commands;

pub use args::{CategoriesArgs, Cli, Commands, GlobalArgs, SearchArgs};
pub use commands::{handle_categories, handle_init_config, handle_search};
