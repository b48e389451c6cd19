//! Turns raw listing entries into validated [`Article`]s.
//!
//! The listing shows publication times in several shapes: absolute dates
//! ("May 10, 2024", "May 10"), relative ones ("3 mins ago", "Yesterday"),
//! and sometimes an epoch-millisecond attribute. Relative forms are resolved
//! against the parser's reference timestamp so a run sees a single "now",
//! and epoch timestamps are read on the same clock (the reference's UTC
//! offset) so a late-evening story keeps the calendar day it was shown with.

use crate::error::{Error, Result};
use crate::models::{Article, RawNode};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(mins?|minutes?|hrs?|hours?|days?)\s+ago$")
        .expect("relative time pattern is valid")
});

const FULL_DATE_FORMATS: [&str; 4] = ["%B %d, %Y", "%B %d %Y", "%b %d, %Y", "%b %d %Y"];
const MONTH_DAY_FORMATS: [&str; 2] = ["%B %d %Y", "%b %d %Y"];

#[derive(Debug, Clone, Copy)]
pub struct ArticleParser {
    now: NaiveDateTime,
    offset: FixedOffset,
}

impl ArticleParser {
    /// Create a parser anchored at `now`.
    ///
    /// # Arguments
    ///
    /// * `now` - The run's reference time. Its wall-clock value resolves
    ///   "3 hours ago" and friends; its offset converts epoch timestamps to
    ///   calendar dates.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let parser = ArticleParser::new(Local::now().fixed_offset());
    /// let article = parser.parse(&node, 0)?;
    /// ```
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: now.naive_local(),
            offset: *now.offset(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// Parse one listing entry.
    ///
    /// Fails with [`Error::ParseFailure`] only when the title or the
    /// publication date cannot be determined; everything else is optional.
    pub fn parse(&self, node: &RawNode, source_order: usize) -> Result<Article> {
        let title = non_blank(node.title.as_deref()).ok_or_else(|| {
            Error::ParseFailure(format!("entry {source_order} has no title"))
        })?;

        let publication_date = self.publication_date(node).ok_or_else(|| {
            Error::ParseFailure(format!(
                "entry {source_order} ({title:?}) has no usable date: {:?}",
                node.timestamp_text
            ))
        })?;

        Ok(Article {
            title,
            publication_date,
            description: non_blank(node.description.as_deref()).unwrap_or_default(),
            image_reference: non_blank(node.image_src.as_deref()),
            source_order,
        })
    }

    fn publication_date(&self, node: &RawNode) -> Option<NaiveDate> {
        if let Some(date) = node
            .timestamp_millis
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.with_timezone(&self.offset).date_naive())
        {
            return Some(date);
        }
        node.timestamp_text
            .as_deref()
            .and_then(|text| self.parse_date_text(text))
    }

    /// Resolve a human-readable timestamp to a calendar date.
    pub fn parse_date_text(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim().trim_end_matches('.');
        if text.is_empty() {
            return None;
        }
        let lower = text.to_lowercase();

        if lower == "now" || lower == "just now" {
            return Some(self.today());
        }
        if lower == "yesterday" {
            return self.today().pred_opt();
        }
        if let Some(caps) = RELATIVE.captures(&lower) {
            let amount: i64 = caps[1].parse().ok()?;
            let unit = &caps[2];
            let offset = if unit.starts_with('m') {
                Duration::try_minutes(amount)?
            } else if unit.starts_with('h') {
                Duration::try_hours(amount)?
            } else {
                Duration::try_days(amount)?
            };
            return self.now.checked_sub_signed(offset).map(|dt| dt.date());
        }

        for format in FULL_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date);
            }
        }

        // "May 10": the most recent such date not after today. "Feb 29" in a
        // non-leap year only exists in an earlier year.
        let year = self.today().year();
        let month_day = text.trim_end_matches(',');
        match month_day_in(month_day, year) {
            Some(date) if date <= self.today() => Some(date),
            this_year => {
                debug!(?this_year, text, "Month-day timestamp not valid this year; using previous year");
                month_day_in(month_day, year - 1)
            }
        }
    }
}

fn month_day_in(month_day: &str, year: i32) -> Option<NaiveDate> {
    let with_year = format!("{month_day} {year}");
    MONTH_DAY_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&with_year, format).ok())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
