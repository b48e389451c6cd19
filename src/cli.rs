//! Command-line interface definitions.
//!
//! Run parameters can come from a JSON work item, from flags, or from
//! environment variables; flags override work-item fields.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the crawler.
///
/// # Examples
///
/// ```sh
/// # Everything from flags
/// news_crawler --search-phrase inflation --category economy --months 2
///
/// # Parameters from a work item, output elsewhere
/// news_crawler --work-item ./work-item.json -o /tmp/crawl
///
/// # Custom site selectors
/// news_crawler -c ./crawler.yaml --search-phrase fed --months 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML crawler configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON work item with `search_phrase`, `category` and `months`
    #[arg(short, long)]
    pub work_item: Option<PathBuf>,

    /// Phrase whose occurrences are counted in each article
    #[arg(short, long, env = "NEWS_SEARCH_PHRASE")]
    pub search_phrase: Option<String>,

    /// Topic used to filter the listing
    #[arg(long, env = "NEWS_CATEGORY")]
    pub category: Option<String>,

    /// Months before the current one to include (0 = current month only)
    #[arg(short, long, env = "NEWS_MONTHS", allow_negative_numbers = true)]
    pub months: Option<i64>,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Stop after this many listing pages (overrides the config file)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Log file (defaults to `news_crawler.log` in the `--output-dir`, or `./output`)
    #[arg(long, env = "NEWS_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}
