//! AP News search-results navigator.
//!
//! Pages are requested as
//! `{base_url}{search_path}?q={category}&s={sort}&p={page}` and scraped with
//! the configured CSS selectors. Each result card becomes one [`RawNode`].
//!
//! # Page Counter
//!
//! The results footer shows a counter like `1 of 1,234`. The listing ends
//! when the current page reaches the total, or when a page has no results.

use super::{Navigator, Page};
use crate::config::{CrawlerConfig, Selectors};
use crate::error::{Error, Result};
use crate::models::RawNode;
use itertools::Itertools;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Compiled form of [`Selectors`].
#[derive(Debug, Clone)]
struct ListingSelectors {
    item: Selector,
    title: Selector,
    description: Selector,
    timestamp_text: Selector,
    timestamp_attr: Selector,
    timestamp_attr_name: String,
    image: Selector,
    page_counts: Selector,
}

impl ListingSelectors {
    fn compile(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            item: compile(&selectors.item)?,
            title: compile(&selectors.title)?,
            description: compile(&selectors.description)?,
            timestamp_text: compile(&selectors.timestamp_text)?,
            timestamp_attr: compile(&selectors.timestamp_attr)?,
            timestamp_attr_name: selectors.timestamp_attr_name.clone(),
            image: compile(&selectors.image)?,
            page_counts: compile(&selectors.page_counts)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Entries and page counter scraped from one results page.
#[derive(Debug, Default)]
struct Listing {
    nodes: Vec<RawNode>,
    /// `(current, total)` from the pagination footer.
    counts: Option<(u32, u32)>,
}

#[derive(Debug)]
pub struct ApNewsNavigator {
    client: Client,
    base_url: Url,
    search_path: String,
    newest_sort_value: String,
    selectors: ListingSelectors,
    query: String,
    sort: Option<String>,
    /// 1-based index of the next page to request.
    page: u32,
}

impl ApNewsNavigator {
    /// Create a navigator positioned before the first results page.
    ///
    /// # Arguments
    ///
    /// * `config` - Site URLs, sort value, CSS selectors and HTTP settings
    ///
    /// # Returns
    ///
    /// The navigator, or an error if `base_url` is not a URL, a selector
    /// does not compile, or the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut navigator = ApNewsNavigator::new(&CrawlerConfig::default())?;
    /// navigator.apply_category_filter("economy").await?;
    /// navigator.sort_newest_first().await?;
    /// let first = navigator.next_page().await?;
    /// ```
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::InvalidParameter(format!("base_url {:?}: {e}", config.base_url))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::NavigationFailure(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            search_path: config.search_path.clone(),
            newest_sort_value: config.newest_sort_value.clone(),
            selectors: ListingSelectors::compile(&config.selectors)?,
            query: String::new(),
            sort: None,
            page: 1,
        })
    }

    fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = self.base_url.join(&self.search_path).map_err(|e| {
            Error::InvalidParameter(format!("search_path {:?}: {e}", self.search_path))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &self.query);
            if let Some(sort) = &self.sort {
                query.append_pair("s", sort);
            }
            query.append_pair("p", &page.to_string());
        }
        Ok(url)
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let navigation = |e: reqwest::Error| Error::NavigationFailure(format!("{url}: {e}"));
        self.client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(navigation)?
            .text()
            .await
            .map_err(navigation)
    }
}

impl Navigator for ApNewsNavigator {
    async fn apply_category_filter(&mut self, category: &str) -> Result<()> {
        self.query = category.trim().to_string();
        self.page = 1;
        debug!(query = %self.query, "Category filter applied");
        Ok(())
    }

    async fn sort_newest_first(&mut self) -> Result<()> {
        self.sort = Some(self.newest_sort_value.clone());
        self.page = 1;
        debug!(sort = %self.newest_sort_value, "Newest-first sort applied");
        Ok(())
    }

    #[instrument(level = "info", skip_all, fields(page = self.page))]
    async fn next_page(&mut self) -> Result<Page> {
        let url = self.page_url(self.page)?;
        let html = self.fetch(&url).await?;
        let listing = parse_listing(&html, &self.selectors, &self.base_url);
        self.page += 1;

        let end_of_pages = listing.nodes.is_empty()
            || listing
                .counts
                .is_some_and(|(current, total)| current >= total);
        if listing.counts.is_none() {
            warn!(%url, "No pagination counter found on page");
        }
        info!(
            %url,
            entries = listing.nodes.len(),
            counts = ?listing.counts,
            end_of_pages,
            "Fetched listing page"
        );

        Ok(Page {
            nodes: listing.nodes,
            end_of_pages,
        })
    }
}

fn parse_listing(html: &str, selectors: &ListingSelectors, base_url: &Url) -> Listing {
    let document = Html::parse_document(html);

    let nodes = document
        .select(&selectors.item)
        .map(|item| RawNode {
            title: first_text(item, &selectors.title),
            timestamp_text: first_text(item, &selectors.timestamp_text),
            timestamp_millis: item
                .select(&selectors.timestamp_attr)
                .find_map(|el| el.value().attr(&selectors.timestamp_attr_name))
                .and_then(|raw| raw.trim().parse().ok()),
            description: first_text(item, &selectors.description),
            image_src: item
                .select(&selectors.image)
                .find_map(|el| el.value().attr("src").or_else(|| el.value().attr("data-src")))
                .and_then(|src| base_url.join(src.trim()).ok())
                .map(|url| url.to_string()),
        })
        .collect();

    let counts = document
        .select(&selectors.page_counts)
        .next()
        .and_then(|el| parse_page_counts(&el.text().collect::<String>()));

    Listing { nodes, counts }
}

/// Whitespace-normalised text of the first element matching `selector`.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().flat_map(str::split_whitespace).join(" "))
}

/// Parse a pagination counter such as `"2 of 1,234"`.
fn parse_page_counts(text: &str) -> Option<(u32, u32)> {
    let (current, total) = text.split_once(" of ")?;
    let number = |s: &str| s.trim().replace(',', "").parse::<u32>().ok();
    Some((number(current)?, number(total)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
<html><body>
<div class="SearchResultsModule-results">
  <div class="PageList-items">
    <div class="PageList-items-item">
      <div class="PagePromo">
        <div class="PagePromo-media">
          <img class="Image" src="/images/markets.jpg" alt="">
        </div>
        <h3 class="PagePromo-title"><a href="/article/1"><span>Markets
          rally on   earnings</span></a></h3>
        <div class="PagePromo-description">Stocks rose $1,200 on Tuesday.</div>
        <bsp-timestamp data-timestamp="1715299200000">
          <span class="Timestamp-template">May 10, 2024</span>
        </bsp-timestamp>
      </div>
    </div>
    <div class="PageList-items-item">
      <div class="PagePromo">
        <h3 class="PagePromo-title"><a href="/article/2">No picture here</a></h3>
        <span class="Timestamp-template-now">3 mins ago</span>
      </div>
    </div>
  </div>
</div>
<div class="Pagination-pageCounts">1 of 1,234</div>
</body></html>
"#;

    fn selectors() -> ListingSelectors {
        ListingSelectors::compile(&Selectors::default()).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://apnews.com").unwrap()
    }

    #[test]
    fn test_parse_listing_extracts_cards() {
        let listing = parse_listing(RESULTS_PAGE, &selectors(), &base());
        assert_eq!(listing.nodes.len(), 2);

        let first = &listing.nodes[0];
        assert_eq!(first.title.as_deref(), Some("Markets rally on earnings"));
        assert_eq!(first.timestamp_text.as_deref(), Some("May 10, 2024"));
        assert_eq!(first.timestamp_millis, Some(1_715_299_200_000));
        assert_eq!(first.description.as_deref(), Some("Stocks rose $1,200 on Tuesday."));
        assert_eq!(
            first.image_src.as_deref(),
            Some("https://apnews.com/images/markets.jpg")
        );

        let second = &listing.nodes[1];
        assert_eq!(second.title.as_deref(), Some("No picture here"));
        assert_eq!(second.timestamp_text.as_deref(), Some("3 mins ago"));
        assert_eq!(second.timestamp_millis, None);
        assert_eq!(second.description, None);
        assert_eq!(second.image_src, None);
    }

    #[test]
    fn test_parse_listing_page_counts() {
        let listing = parse_listing(RESULTS_PAGE, &selectors(), &base());
        assert_eq!(listing.counts, Some((1, 1234)));
    }

    #[test]
    fn test_parse_listing_empty_page() {
        let listing = parse_listing("<html><body></body></html>", &selectors(), &base());
        assert!(listing.nodes.is_empty());
        assert_eq!(listing.counts, None);
    }

    #[test]
    fn test_parse_page_counts() {
        assert_eq!(parse_page_counts("3 of 10"), Some((3, 10)));
        assert_eq!(parse_page_counts(" 12 of 1,000 "), Some((12, 1000)));
        assert_eq!(parse_page_counts("page three"), None);
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut custom = Selectors::default();
        custom.title = "h3[".to_string();
        let err = ListingSelectors::compile(&custom).unwrap_err();
        assert!(matches!(err, Error::Selector { .. }));
    }

    #[tokio::test]
    async fn test_page_url_carries_filter_sort_and_page() {
        let mut navigator = ApNewsNavigator::new(&CrawlerConfig::default()).unwrap();
        navigator.apply_category_filter(" climate change ").await.unwrap();
        navigator.sort_newest_first().await.unwrap();

        let url = navigator.page_url(2).unwrap();
        assert_eq!(url.path(), "/search");
        assert_eq!(url.query(), Some("q=climate+change&s=3&p=2"));
    }
}
