//! JSON export of the collected records.

use crate::models::ExportRecord;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const FILE_NAME: &str = "result.json";

/// Write `records` as a pretty-printed JSON array to `{output_dir}/result.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_records(
    records: &[ExportRecord],
    output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(records)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = output_dir.join(FILE_NAME);
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = records.len(), "Wrote JSON records");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_write_records_round_trip() {
        let dir = std::env::temp_dir().join(format!("news_crawler_json_{}", std::process::id()));
        let records = vec![ExportRecord {
            title: "Markets rally".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            description: "Stocks rose $5".to_string(),
            image_local_path: Some(PathBuf::from("output/images/image_1.jpg")),
            phrase_count: 1,
            has_monetary_value: true,
        }];

        let path = write_records(&records, &dir).await.unwrap();
        assert_eq!(path, dir.join(FILE_NAME));

        let written = fs::read_to_string(&path).await.unwrap();
        let back: Vec<ExportRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(back, records);

        let _ = fs::remove_dir_all(&dir).await;
    }
}
