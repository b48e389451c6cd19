//! Record exporters.
//!
//! Every writer takes the ordered records of one run and replaces any
//! output from a previous run:
//!
//! ```text
//! output_dir/
//! ├── result.json       # ExportRecord array
//! ├── result.md         # the same rows as a Markdown table
//! ├── result.xlsx       # the same rows as a spreadsheet
//! ├── images.zip        # every downloaded image
//! ├── news_crawler.log
//! └── images/
//!     ├── image_1.jpg
//!     └── image_2.png
//! ```

pub mod archive;
pub mod json;
pub mod markdown;
pub mod xlsx;

/// Column headers shared by the tabular exports, in row order.
pub const COLUMNS: [&str; 6] = [
    "Title",
    "Date",
    "Description",
    "Image Path",
    "Phrase Count",
    "Has Monetary Value",
];
