//! Command handlers for the HSE catalog CLI
//!
//! This module implements the command handlers that connect CLI arguments
//! with the catalog client, the category browser and search sessions.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::app::{
    ApiClient, BrowserState, CatalogApi, CategoryBrowser, CategoryTree, NodeId, ProductHit,
    SearchSession, SessionState,
};
use crate::cli::{CategoriesArgs, SearchArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Build the API client described by the configuration
fn build_api(config: &AppConfig) -> Result<Arc<dyn CatalogApi>> {
    let client = ApiClient::new(&config.to_runtime_config())?;
    Ok(Arc::new(client))
}

fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load the category tree, offering one retry on failure
async fn load_tree(api: Arc<dyn CatalogApi>) -> Result<Arc<CategoryTree>> {
    let browser = CategoryBrowser::new(api);
    let progress = spinner("Loading categories...");

    browser.load().await;
    if let BrowserState::Failed(error) = browser.state() {
        if error.is_retryable() {
            warn!("Loading categories failed, retrying once: {}", error);
            browser.retry().await;
        }
    }
    progress.finish_and_clear();

    match browser.state() {
        BrowserState::Loaded(tree) => Ok(tree),
        BrowserState::Failed(error) => Err(error.into()),
        other => Err(AppError::generic(format!(
            "Category browser ended in unexpected state: {:?}",
            other
        ))),
    }
}

/// Handle the categories command
pub async fn handle_categories(args: CategoriesArgs, config: &AppConfig) -> Result<()> {
    let api = build_api(config)?;
    let tree = load_tree(api).await?;

    info!(
        "Category tree has {} top-level categories and {} nodes",
        tree.roots().len(),
        tree.len()
    );

    let max_depth = args.depth.unwrap_or(usize::MAX);
    for line in render_tree(&tree, max_depth) {
        println!("{}", line);
    }
    Ok(())
}

/// Indented tree listing, one line per node up to `max_depth`
pub fn render_tree(tree: &CategoryTree, max_depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<NodeId> = tree.roots().iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let depth = tree.depth(id);
        if depth > max_depth {
            continue;
        }

        let children = tree.children(id);
        let indent = "  ".repeat(depth - 1);
        if children.is_empty() {
            lines.push(format!("{}{}", indent, tree.display_name(id)));
        } else {
            lines.push(format!(
                "{}{} ({} subcategories)",
                indent,
                tree.display_name(id),
                children.len()
            ));
        }
        stack.extend(children.iter().rev().copied());
    }

    lines
}

/// Handle the search command
///
/// Drives a search session: initial search, then further pages until the
/// requested number of pages is loaded or the result is exhausted. A
/// network failure is retried once.
pub async fn handle_search(args: SearchArgs, config: &AppConfig) -> Result<()> {
    args.validate().map_err(AppError::generic)?;
    let api = build_api(config)?;

    if args.validate_path {
        let tree = load_tree(Arc::clone(&api)).await?;
        if tree.find_by_path(&args.category).is_none() {
            return Err(AppError::generic(format!(
                "Unknown category path: {}",
                args.category
            )));
        }
    }

    let mut session = SearchSession::new(api, args.category.clone());
    if let Some(page_size) = args.hits_per_page.or(config.search.hits_per_page) {
        session = session.with_page_size(page_size);
    }

    let progress = spinner(format!("Searching {}...", args.category));
    let outcome = drive_search(&session, &args, |hit| {
        progress.suspend(|| println!("{}", format_hit(hit)));
    })
    .await;
    progress.finish_and_clear();
    outcome?;

    println!();
    println!("{}", session.title());
    println!(
        "{} products shown{}",
        session.hit_count(),
        if session.has_more_to_load() {
            " (more available)"
        } else {
            ""
        }
    );
    Ok(())
}

/// Run `session` until `args.pages` pages are loaded or no more exist
///
/// `on_hit` sees every hit once, in order. A page that replaces an earlier
/// one with fewer hits yields nothing new. Returns the number of pages
/// loaded.
pub async fn drive_search(
    session: &SearchSession,
    args: &SearchArgs,
    mut on_hit: impl FnMut(&ProductHit),
) -> Result<u32> {
    let mut states = session.subscribe();
    session.start_initial_search(&args.query);

    let mut printed = 0;
    let mut pages_loaded = 0;
    let mut retried = false;

    while let Some(state) = states.recv().await {
        match state {
            SessionState::Loading => {
                debug!("Request in flight for {}", session.category_path());
            }
            SessionState::Loaded { hits, paging } => {
                pages_loaded += 1;
                for hit in hits.iter().skip(printed) {
                    on_hit(hit);
                }
                printed = printed.max(hits.len());

                let total_pages = paging.map_or(1, |paging| paging.page_count);
                info!("Loaded {} of {} pages", pages_loaded, total_pages);
                if pages_loaded >= args.pages || !session.load_more() {
                    break;
                }
            }
            SessionState::Failed(error) => {
                if !retried && error.is_retryable() {
                    warn!("Search failed, retrying once: {}", error);
                    retried = true;
                    session.retry();
                } else {
                    return Err(error.into());
                }
            }
            SessionState::Idle => {}
        }
    }

    Ok(pages_loaded)
}

/// One-line summary of a product hit
pub fn format_hit(hit: &ProductHit) -> String {
    let mut line = format!("{:>4}. {}", hit.position, hit.display_name());
    if let Some(brand) = &hit.base.brand {
        line.push_str(&format!(" [{}]", brand));
    }

    if let Some(variant) = hit.variants.first() {
        match (variant.special_price, variant.regular_price) {
            (Some(special), Some(regular)) if variant.is_discounted() => {
                line.push_str(&format!(" - {:.2} EUR (statt {:.2} EUR)", special, regular));
            }
            (Some(price), _) | (None, Some(price)) => {
                line.push_str(&format!(" - {:.2} EUR", price));
            }
            (None, None) => {}
        }
    }

    if hit.variants.len() > 1 {
        line.push_str(&format!(" ({} variants)", hit.variants.len()));
    }
    line
}

/// Handle the init-config command
pub async fn handle_init_config() -> Result<()> {
    let path = AppConfig::initialize_first_run().await?;
    println!("Configuration file: {}", path.display());
    Ok(())
}
