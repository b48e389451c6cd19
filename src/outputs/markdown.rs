//! Markdown table export of the collected records.
//!
//! Columns, in order: title, date, description, image path, phrase count,
//! has monetary value. Pipes and line breaks inside cells are escaped so
//! each record stays on one table row.

use super::COLUMNS;
use crate::models::ExportRecord;
use itertools::Itertools;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const FILE_NAME: &str = "result.md";

pub fn records_to_markdown(records: &[ExportRecord]) -> String {
    let mut md = String::new();
    writeln!(md, "| {} |", COLUMNS.iter().join(" | ")).unwrap();
    writeln!(md, "|{}|", COLUMNS.iter().map(|_| "---").join("|")).unwrap();

    for record in records {
        let image = record
            .image_local_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let cells = [
            escape_cell(&record.title),
            record.publication_date.to_string(),
            escape_cell(&record.description),
            escape_cell(&image),
            record.phrase_count.to_string(),
            record.has_monetary_value.to_string(),
        ];
        writeln!(md, "| {} |", cells.iter().join(" | ")).unwrap();
    }
    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .split_whitespace()
        .join(" ")
}

#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_records(
    records: &[ExportRecord],
    output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(FILE_NAME);
    fs::write(&path, records_to_markdown(records)).await?;
    info!(path = %path.display(), count = records.len(), "Wrote Markdown table");
    Ok(path)
}
