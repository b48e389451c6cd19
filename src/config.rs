//! Crawler configuration and run parameters.
//!
//! Site-specific settings (URLs, CSS selectors, HTTP behaviour) come from an
//! optional YAML file; every field has a default matching AP News search
//! results. Per-run parameters (search phrase, category, month count) come
//! from a JSON work item, the command line, or both, with the command line
//! taking precedence.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// How the listing is ordered, which decides whether pagination may stop
/// early once an out-of-window article shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingOrder {
    /// Strictly newest first: the first stale article ends pagination.
    #[default]
    NewestFirst,
    /// No ordering guarantee: every page is scanned.
    Unsorted,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub base_url: String,
    pub search_path: String,
    /// Value of the `s` query parameter selecting newest-first sorting.
    pub newest_sort_value: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Extra attempts for a failed page request.
    pub navigation_retries: usize,
    pub listing_order: ListingOrder,
    pub max_pages: Option<usize>,
    pub output_dir: String,
    pub selectors: Selectors,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apnews.com".to_string(),
            search_path: "/search".to_string(),
            newest_sort_value: "3".to_string(),
            user_agent: concat!("news_crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            navigation_retries: 1,
            listing_order: ListingOrder::NewestFirst,
            max_pages: None,
            output_dir: "./output".to_string(),
            selectors: Selectors::default(),
        }
    }
}

/// CSS selectors locating each field of a listing entry.
///
/// Field selectors are evaluated relative to the matched `item`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub item: String,
    pub title: String,
    pub description: String,
    pub timestamp_text: String,
    /// Element carrying an epoch-millisecond attribute.
    pub timestamp_attr: String,
    pub timestamp_attr_name: String,
    pub image: String,
    /// Pagination counter such as "1 of 1,234".
    pub page_counts: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            item: ".SearchResultsModule-results .PageList-items .PageList-items-item".to_string(),
            title: ".PagePromo-title".to_string(),
            description: ".PagePromo-description".to_string(),
            timestamp_text: ".Timestamp-template, .Timestamp-template-now".to_string(),
            timestamp_attr: "bsp-timestamp[data-timestamp]".to_string(),
            timestamp_attr_name: "data-timestamp".to_string(),
            image: ".PagePromo-media img.Image".to_string(),
            page_counts: ".Pagination-pageCounts".to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Load from a YAML file, or use defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&yaml)?;
        info!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Work item payload as handed over by the job scheduler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkItem {
    pub search_phrase: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "time_option")]
    pub months: Option<i64>,
}

impl WorkItem {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Parameters for one crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub search_phrase: String,
    pub category: String,
    pub months_back: i64,
}

impl RunParameters {
    /// Merge work-item fields with overrides; overrides win.
    ///
    /// Only presence is checked here. Value validation (empty phrase,
    /// negative month count) belongs to the pipeline.
    pub fn resolve(
        work_item: WorkItem,
        search_phrase: Option<String>,
        category: Option<String>,
        months: Option<i64>,
    ) -> Result<Self> {
        let search_phrase = search_phrase
            .or(work_item.search_phrase)
            .ok_or_else(|| Error::InvalidParameter("missing search_phrase".to_string()))?;
        let months_back = months
            .or(work_item.months)
            .ok_or_else(|| Error::InvalidParameter("missing months".to_string()))?;
        let category = category.or(work_item.category).unwrap_or_default();

        Ok(Self {
            search_phrase,
            category,
            months_back,
        })
    }
}
