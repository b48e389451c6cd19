//! Page-by-page traversal of the listing with the date-window stopping rule.
//!
//! With a newest-first listing, the first article older than the window
//! boundary means every later page is stale: no further page is requested,
//! but the rest of the page already in hand is still examined. With an
//! unsorted listing the controller scans until the navigator runs out.

use crate::config::ListingOrder;
use crate::error::Error;
use crate::models::{Article, ArticleKey};
use crate::navigator::Navigator;
use crate::parser::ArticleParser;
use crate::utils::truncate_for_log;
use crate::window::DateWindow;
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};

/// Why pagination ended.
#[derive(Debug)]
pub enum StopReason {
    /// An out-of-window article appeared in a newest-first listing.
    WindowExhausted,
    EndOfPages,
    PageLimit,
    /// A page could not be retrieved; articles gathered so far are kept.
    NavigationFailed(Error),
}

#[derive(Debug)]
pub struct Harvest {
    /// Unique in-window articles in discovery order.
    pub articles: Vec<Article>,
    pub stop: StopReason,
    pub pages_fetched: usize,
}

pub struct PaginationController<'a, N> {
    navigator: &'a mut N,
    parser: ArticleParser,
    window: DateWindow,
    order: ListingOrder,
    max_pages: Option<usize>,
}

impl<'a, N: Navigator> PaginationController<'a, N> {
    pub fn new(navigator: &'a mut N, parser: ArticleParser, window: DateWindow) -> Self {
        Self {
            navigator,
            parser,
            window,
            order: ListingOrder::NewestFirst,
            max_pages: None,
        }
    }

    pub fn with_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Request pages until the window, the listing, or the page limit runs
    /// out.
    ///
    /// Never fails: a navigation error becomes
    /// [`StopReason::NavigationFailed`] and the articles gathered before it
    /// are returned with it. Entries that fail to parse are logged and
    /// skipped.
    #[instrument(level = "info", skip_all, fields(boundary = %self.window.boundary()))]
    pub async fn harvest(self) -> Harvest {
        let mut seen: HashSet<ArticleKey> = HashSet::new();
        let mut articles = Vec::new();
        let mut pages_fetched = 0usize;
        let mut position = 0usize;

        let stop = loop {
            if self.max_pages.is_some_and(|max| pages_fetched >= max) {
                info!(pages_fetched, "Page limit reached");
                break StopReason::PageLimit;
            }

            let page = match self.navigator.next_page().await {
                Ok(page) => page,
                Err(e) => {
                    error!(pages_fetched, error = %e, "Page fetch failed; keeping articles gathered so far");
                    break StopReason::NavigationFailed(e);
                }
            };
            pages_fetched += 1;

            let mut saw_stale = false;
            let mut kept = 0usize;
            for node in &page.nodes {
                let source_order = position;
                position += 1;

                let article = match self.parser.parse(node, source_order) {
                    Ok(article) => article,
                    Err(e) => {
                        warn!(source_order, error = %e, "Skipping unparseable entry");
                        continue;
                    }
                };

                if !self.window.contains(article.publication_date) {
                    debug!(
                        source_order,
                        date = %article.publication_date,
                        title = %truncate_for_log(&article.title, 80),
                        "Entry is older than the window"
                    );
                    saw_stale = true;
                    continue;
                }

                if !seen.insert(article.key()) {
                    debug!(source_order, title = %truncate_for_log(&article.title, 80), "Dropping duplicate entry");
                    continue;
                }

                kept += 1;
                articles.push(article);
            }

            info!(
                page = pages_fetched,
                entries = page.nodes.len(),
                kept,
                total = articles.len(),
                "Processed listing page"
            );

            if saw_stale && self.order == ListingOrder::NewestFirst {
                info!(page = pages_fetched, "Reached articles older than the window");
                break StopReason::WindowExhausted;
            }
            if page.end_of_pages {
                break StopReason::EndOfPages;
            }
        };

        Harvest {
            articles,
            stop,
            pages_fetched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawNode;
    use crate::navigator::testing::{ScriptedNavigator, last_page, node, page};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn parser() -> ArticleParser {
        let now = Utc.with_ymd_and_hms(2024, 5, 12, 9, 0, 0).unwrap();
        ArticleParser::new(now.fixed_offset())
    }

    /// Boundary May 1, 2024.
    fn window() -> DateWindow {
        DateWindow::new(NaiveDate::from_ymd_opt(2024, 5, 12).unwrap(), 0).unwrap()
    }

    fn titles(harvest: &Harvest) -> Vec<&str> {
        harvest.articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_stops_at_first_stale_article() {
        let mut navigator = ScriptedNavigator::new(vec![
            page(vec![
                node("Tenth", "May 10, 2024"),
                node("First", "May 1, 2024"),
                node("Stale", "April 20, 2024"),
            ]),
            page(vec![node("Never fetched", "May 11, 2024")]),
        ]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Tenth", "First"]);
        assert!(matches!(harvest.stop, StopReason::WindowExhausted));
        assert_eq!(harvest.pages_fetched, 1);
        assert_eq!(navigator.requests, 1);
        assert_eq!(navigator.remaining(), 1);
    }

    #[tokio::test]
    async fn test_finishes_current_page_after_stale_entry() {
        let mut navigator = ScriptedNavigator::new(vec![page(vec![
            node("Fresh", "May 10, 2024"),
            node("Stale", "April 2, 2024"),
            node("Late fresh", "May 3, 2024"),
        ])]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Fresh", "Late fresh"]);
        assert_eq!(navigator.requests, 1);
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_dropped() {
        let repeated = node("Repeated story", "May 9, 2024");
        let mut navigator = ScriptedNavigator::new(vec![
            page(vec![node("Top", "May 11, 2024"), repeated.clone()]),
            last_page(vec![repeated, node("Other", "May 8, 2024")]),
        ]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Top", "Repeated story", "Other"]);
        assert!(matches!(harvest.stop, StopReason::EndOfPages));
        assert_eq!(harvest.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_unparseable_entry_skipped_without_aborting_page() {
        let undated = RawNode {
            title: Some("No date".to_string()),
            ..RawNode::default()
        };
        let mut navigator = ScriptedNavigator::new(vec![last_page(vec![
            node("Before", "May 10, 2024"),
            undated,
            node("After", "May 9, 2024"),
        ])]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Before", "After"]);
        let orders: Vec<usize> = harvest.articles.iter().map(|a| a.source_order).collect();
        assert_eq!(orders, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_navigation_failure_keeps_gathered_articles() {
        let mut navigator = ScriptedNavigator::new(vec![
            page(vec![node("Kept", "May 10, 2024")]),
            Err(Error::NavigationFailure("connection reset".to_string())),
        ]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Kept"]);
        assert!(matches!(
            harvest.stop,
            StopReason::NavigationFailed(Error::NavigationFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_unsorted_listing_scans_every_page() {
        let mut navigator = ScriptedNavigator::new(vec![
            page(vec![node("Stale", "March 3, 2024"), node("Fresh", "May 2, 2024")]),
            last_page(vec![node("Also fresh", "May 4, 2024")]),
        ]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .with_order(ListingOrder::Unsorted)
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["Fresh", "Also fresh"]);
        assert!(matches!(harvest.stop, StopReason::EndOfPages));
        assert_eq!(navigator.requests, 2);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let mut navigator = ScriptedNavigator::new(vec![
            page(vec![node("One", "May 10, 2024")]),
            page(vec![node("Two", "May 9, 2024")]),
            page(vec![node("Three", "May 8, 2024")]),
        ]);

        let harvest = PaginationController::new(&mut navigator, parser(), window())
            .with_max_pages(Some(2))
            .harvest()
            .await;

        assert_eq!(titles(&harvest), vec!["One", "Two"]);
        assert!(matches!(harvest.stop, StopReason::PageLimit));
        assert_eq!(navigator.requests, 2);
    }
}
