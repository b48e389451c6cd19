//! # News Crawler
//!
//! Collects recent articles from a paginated news search listing, counts a
//! search phrase in each one, flags mentions of money, downloads the
//! article images, and exports the result as JSON and a Markdown table.
//!
//! ## Usage
//!
//! ```sh
//! news_crawler --search-phrase inflation --category economy --months 1
//! ```
//!
//! ## Architecture
//!
//! 1. **Parameters**: work item and flags resolved into [`RunParameters`]
//! 2. **Traversal**: listing pages fetched newest first until articles fall
//!    out of the month window
//! 3. **Enrichment**: phrase count, money flag, and image per article
//! 4. **Output**: `result.json`, `result.md`, `result.xlsx`, `images/`, and
//!    `images.zip`
//!
//! Logs go to stdout and to `news_crawler.log` in the output directory
//! (or wherever `--log-file` points).

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod assemble;
mod classify;
mod cli;
mod config;
mod error;
mod images;
mod models;
mod navigator;
mod outputs;
mod pagination;
mod parser;
mod pipeline;
mod utils;
mod window;

use cli::Cli;
use config::{CrawlerConfig, RunParameters, WorkItem};
use images::{DiskImageStore, ImageFetcher};
use navigator::{ApNewsNavigator, RetryNavigator};
use outputs::{archive, json, markdown, xlsx};
use pipeline::PipelineOptions;
use utils::ensure_writable_dir;

const DEFAULT_OUTPUT_DIR: &str = "./output";
const LOG_FILE: &str = "news_crawler.log";

/// Install the stdout and log-file subscribers.
///
/// # Arguments
///
/// * `log_file` - File that receives a copy of every event, without ANSI
///   colours; its directory is created if missing
///
/// # Returns
///
/// The guard that flushes the file writer; keep it alive until exit.
fn init_tracing(log_file: &Path) -> Result<WorkerGuard, Box<dyn Error>> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or("log file path has no file name")?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(file_writer),
        )
        .init();
    Ok(guard)
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let log_file = args.log_file.clone().unwrap_or_else(|| {
        args.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
            .join(LOG_FILE)
    });
    let _log_guard = init_tracing(&log_file)?;

    let start_time = std::time::Instant::now();
    info!(log_file = %log_file.display(), "news_crawler starting up");
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration & parameters ----
    let mut config = CrawlerConfig::load(args.config.as_deref())?;
    if args.max_pages.is_some() {
        config.max_pages = args.max_pages;
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let work_item = match &args.work_item {
        Some(path) => {
            let item = WorkItem::load(path)?;
            info!(path = %path.display(), "Loaded work item");
            item
        }
        None => WorkItem::default(),
    };
    let params = match RunParameters::resolve(
        work_item,
        args.search_phrase.clone(),
        args.category.clone(),
        args.months,
    ) {
        Ok(params) => params,
        Err(e) => {
            error!(error = %e, "Invalid run parameters");
            return Err(e.into());
        }
    };

    // Early check: ensure output dir is writable before crawling
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Crawl ----
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let mut navigator = RetryNavigator::new(
        ApNewsNavigator::new(&config)?,
        config.navigation_retries,
        Duration::from_secs(1),
    );
    let images_dir = output_dir.join("images");
    let mut images = ImageFetcher::new(DiskImageStore::new(
        images_dir.clone(),
        timeout,
        &config.user_agent,
    )?);
    debug!(dir = %images.store().dir().display(), "Images will be stored here");
    let options = PipelineOptions {
        now: Local::now().fixed_offset(),
        order: config.listing_order,
        max_pages: config.max_pages,
    };

    let outcome = match pipeline::run(&mut navigator, &mut images, &params, &options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Crawl aborted before producing records");
            return Err(e.into());
        }
    };
    info!(
        records = outcome.records.len(),
        pages = outcome.pages_fetched,
        images = images.stored(),
        stop = ?outcome.stop,
        "Crawl finished"
    );

    // ---- Output ----
    if let Err(e) = json::write_records(&outcome.records, &output_dir).await {
        error!(error = %e, "Failed to write JSON records");
        return Err(e);
    }
    if let Err(e) = markdown::write_records(&outcome.records, &output_dir).await {
        error!(error = %e, "Failed to write Markdown table");
        return Err(e);
    }
    if let Err(e) = xlsx::write_records(&outcome.records, &output_dir).await {
        error!(error = %e, "Failed to write spreadsheet");
        return Err(e);
    }
    if let Err(e) = archive::write_archive(&images_dir, &output_dir).await {
        error!(error = %e, "Failed to archive images");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    if let Some(e) = outcome.navigation_error() {
        error!(error = %e, "Listing traversal was cut short; exported a partial record set");
        return Err(e.to_string().into());
    }
    Ok(())
}
