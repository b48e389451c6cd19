//! Listing navigation.
//!
//! A [`Navigator`] walks a paginated, filterable article listing and hands
//! back one page of [`RawNode`]s at a time. The pipeline owns the navigator
//! for exactly one run.
//!
//! | Type | Module | Notes |
//! |------|--------|-------|
//! | [`ApNewsNavigator`] | [`apnews`] | HTTP + HTML scraping of search results |
//! | [`RetryNavigator`] | [`retry`] | Backoff decorator around any navigator |

use crate::error::Result;
use crate::models::RawNode;

pub mod apnews;
pub mod retry;

pub use apnews::ApNewsNavigator;
pub use retry::RetryNavigator;

/// One page of listing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Entries in listing order.
    pub nodes: Vec<RawNode>,
    /// No page follows this one.
    pub end_of_pages: bool,
}

/// Access to a paginated article listing.
///
/// Implementations must not advance their page cursor when `next_page`
/// fails, so that callers may retry the same page.
pub trait Navigator {
    /// Restrict the listing to a topic or search term.
    async fn apply_category_filter(&mut self, category: &str) -> Result<()>;

    /// Order the listing newest first.
    async fn sort_newest_first(&mut self) -> Result<()>;

    /// Fetch the next page. Fails with
    /// [`Error::NavigationFailure`](crate::error::Error::NavigationFailure).
    async fn next_page(&mut self) -> Result<Page>;
}
