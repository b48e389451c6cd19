//! Mapping of a classified article onto the exported row shape.

use crate::models::{Article, ClassificationResult, ExportRecord};
use std::path::PathBuf;

/// Combine an article with its classification and stored image.
///
/// # Arguments
///
/// * `article` - The parsed article; its title, date and description move
///   into the record
/// * `classification` - Phrase count and money flag for the same article
/// * `image_local_path` - Where the image was stored, or `None` when the
///   article had no image or the download failed
pub fn assemble(
    article: Article,
    classification: ClassificationResult,
    image_local_path: Option<PathBuf>,
) -> ExportRecord {
    ExportRecord {
        title: article.title,
        publication_date: article.publication_date,
        description: article.description,
        image_local_path,
        phrase_count: classification.phrase_count,
        has_monetary_value: classification.has_monetary_value,
    }
}
