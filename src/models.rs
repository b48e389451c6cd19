//! Data models shared by the crawling pipeline.
//!
//! - [`RawNode`]: fields lifted from one listing entry by a navigator
//! - [`Article`]: a parsed, validated listing entry
//! - [`ClassificationResult`]: text heuristics computed for an article
//! - [`ExportRecord`]: the row handed to the exporters

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One listing entry as the navigator found it, before any validation.
///
/// Every field is optional: the navigator copies whatever the page exposes
/// and leaves the decision about what is usable to the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    /// Headline text.
    pub title: Option<String>,
    /// Human-readable timestamp such as `"2 hours ago"` or `"May 10, 2024"`.
    pub timestamp_text: Option<String>,
    /// Machine-readable publication time in epoch milliseconds, when present.
    pub timestamp_millis: Option<i64>,
    /// Teaser text shown under the headline.
    pub description: Option<String>,
    /// Image URL, absolute once the navigator has resolved it.
    pub image_src: Option<String>,
}

/// A parsed article. Never mutated after the parser creates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub publication_date: NaiveDate,
    /// Trimmed teaser text; empty when the listing had none.
    pub description: String,
    pub image_reference: Option<String>,
    /// Position in the listing across all pages, starting at zero.
    pub source_order: usize,
}

/// Identity of an article for deduplication across pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleKey {
    pub title: String,
    pub publication_date: NaiveDate,
}

impl Article {
    pub fn key(&self) -> ArticleKey {
        ArticleKey {
            title: self.title.clone(),
            publication_date: self.publication_date,
        }
    }

    /// Title and description joined with a single space.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub phrase_count: usize,
    pub has_monetary_value: bool,
}

/// One exported row.
///
/// Field order matches the column order of the exporters: title, date,
/// description, image path, phrase count, has monetary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub title: String,
    pub publication_date: NaiveDate,
    pub description: String,
    pub image_local_path: Option<PathBuf>,
    pub phrase_count: usize,
    pub has_monetary_value: bool,
}
