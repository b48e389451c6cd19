//! One crawl from parameters to export-ready records.
//!
//! 1. **Validation**: empty search phrase or negative month count aborts the
//!    run before the navigator is touched
//! 2. **Session**: category filter and newest-first sort
//! 3. **Harvest**: [`PaginationController`] gathers unique in-window articles
//! 4. **Enrichment**: classification, image fetch, and record assembly, in
//!    discovery order
//!
//! A navigation failure ends step 3 early but the records built from what
//! was gathered are still returned alongside the failure.

use crate::assemble::assemble;
use crate::classify::classify;
use crate::config::{ListingOrder, RunParameters};
use crate::error::{Error, Result};
use crate::images::{ImageFetcher, ImageStore};
use crate::models::ExportRecord;
use crate::navigator::Navigator;
use crate::pagination::{PaginationController, StopReason};
use crate::parser::ArticleParser;
use crate::utils::truncate_for_log;
use crate::window::DateWindow;
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Reference time for the date window and relative timestamps. Its
    /// offset is the clock epoch timestamps are read on.
    pub now: DateTime<FixedOffset>,
    pub order: ListingOrder,
    pub max_pages: Option<usize>,
}

#[derive(Debug)]
pub struct RunOutcome {
    /// Records in discovery order, newest first.
    pub records: Vec<ExportRecord>,
    pub stop: StopReason,
    pub pages_fetched: usize,
}

impl RunOutcome {
    /// The navigation error that cut the run short, if any.
    pub fn navigation_error(&self) -> Option<&Error> {
        match &self.stop {
            StopReason::NavigationFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Check run parameters and derive the date window.
pub fn validate(params: &RunParameters, today: NaiveDate) -> Result<DateWindow> {
    if params.search_phrase.trim().is_empty() {
        return Err(Error::InvalidParameter(
            "search phrase must not be empty".to_string(),
        ));
    }
    DateWindow::new(today, params.months_back)
}

/// Crawl the listing and build export records.
///
/// # Arguments
///
/// * `navigator` - Listing source; the category filter and sort are applied
///   before the first page is requested
/// * `images` - Per-run image cache and store
/// * `params` - Search phrase, category and month count
/// * `options` - Reference time, listing order and page limit
///
/// # Returns
///
/// `Err` only for invalid parameters, before any navigation. Otherwise a
/// [`RunOutcome`] whose `stop` says whether the listing was read to its
/// natural end or cut short by a navigation failure.
///
/// # Example
///
/// ```ignore
/// let outcome = pipeline::run(&mut navigator, &mut images, &params, &options).await?;
/// json::write_records(&outcome.records, &output_dir).await?;
/// ```
#[instrument(
    level = "info",
    skip_all,
    fields(search_phrase = %params.search_phrase, category = %params.category, months_back = params.months_back)
)]
pub async fn run<N, S>(
    navigator: &mut N,
    images: &mut ImageFetcher<S>,
    params: &RunParameters,
    options: &PipelineOptions,
) -> Result<RunOutcome>
where
    N: Navigator,
    S: ImageStore,
{
    let window = validate(params, options.now.date_naive())?;
    info!(
        reference = %window.reference_date(),
        months_back = window.months_back(),
        boundary = %window.boundary(),
        "Date window computed"
    );

    if let Err(e) = prepare_session(navigator, &params.category).await {
        error!(error = %e, "Could not prepare the listing");
        return Ok(RunOutcome {
            records: Vec::new(),
            stop: StopReason::NavigationFailed(e),
            pages_fetched: 0,
        });
    }

    let harvest = PaginationController::new(navigator, ArticleParser::new(options.now), window)
        .with_order(options.order)
        .with_max_pages(options.max_pages)
        .harvest()
        .await;
    info!(
        articles = harvest.articles.len(),
        pages = harvest.pages_fetched,
        stop = ?harvest.stop,
        "Listing traversal finished"
    );

    let mut records = Vec::with_capacity(harvest.articles.len());
    for article in harvest.articles {
        let classification = classify(&article, &params.search_phrase)?;

        let image_path = match article.image_reference.as_deref() {
            Some(reference) => match images.fetch(reference).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, title = %truncate_for_log(&article.title, 80), "Continuing without image");
                    None
                }
            },
            None => None,
        };

        info!(
            title = %truncate_for_log(&article.title, 120),
            date = %article.publication_date,
            phrase_count = classification.phrase_count,
            has_monetary_value = classification.has_monetary_value,
            image = ?image_path,
            "Collected article"
        );
        records.push(assemble(article, classification, image_path));
    }

    Ok(RunOutcome {
        records,
        stop: harvest.stop,
        pages_fetched: harvest.pages_fetched,
    })
}

async fn prepare_session<N: Navigator>(navigator: &mut N, category: &str) -> Result<()> {
    if category.trim().is_empty() {
        info!("No category given; using the unfiltered listing");
    } else {
        navigator.apply_category_filter(category).await?;
    }
    navigator.sort_newest_first().await
}
