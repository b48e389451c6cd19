//! Spreadsheet export of the collected records.
//!
//! One worksheet, a bold header row, then one row per record in discovery
//! order. Counts are numeric cells and the money flag is a boolean cell so
//! the sheet can be filtered and summed without conversion.

use super::COLUMNS;
use crate::models::ExportRecord;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const FILE_NAME: &str = "result.xlsx";
const SHEET_NAME: &str = "Articles";

/// Lay out `records` in a new workbook.
///
/// # Arguments
///
/// * `records` - Export rows in the order they should appear
///
/// # Returns
///
/// The in-memory workbook, or an [`XlsxError`] if a cell cannot be written.
pub fn build_workbook(records: &[ExportRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        sheet.write_string(row, 0, record.title.as_str())?;
        sheet.write_string(row, 1, record.publication_date.to_string())?;
        sheet.write_string(row, 2, record.description.as_str())?;
        if let Some(path) = &record.image_local_path {
            sheet.write_string(row, 3, path.display().to_string())?;
        }
        sheet.write_number(row, 4, record.phrase_count as f64)?;
        sheet.write_boolean(row, 5, record.has_monetary_value)?;
    }
    sheet.autofit();

    Ok(workbook)
}

/// Write `records` to `{output_dir}/result.xlsx`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_records(
    records: &[ExportRecord],
    output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let bytes = build_workbook(records)?.save_to_buffer()?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create spreadsheet dir");
        return Err(e.into());
    }

    let path = output_dir.join(FILE_NAME);
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), count = records.len(), "Wrote spreadsheet");
    Ok(path)
}
