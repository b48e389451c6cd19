//! Zip archive of the downloaded images.

use std::error::Error;
use std::ffi::OsString;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const FILE_NAME: &str = "images.zip";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Pack every image file directly inside `images_dir` into
/// `{output_dir}/images.zip`.
///
/// # Arguments
///
/// * `images_dir` - Folder the image store wrote into; a missing folder
///   yields an empty archive
/// * `output_dir` - Folder that receives the archive
///
/// # Returns
///
/// The archive path, or an error if a file cannot be read or written.
#[instrument(level = "info", skip_all, fields(images_dir = %images_dir.display()))]
pub async fn write_archive(images_dir: &Path, output_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let mut names: Vec<OsString> = Vec::new();
    if fs::try_exists(images_dir).await? {
        let mut entries = fs::read_dir(images_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() && is_image(&entry.path()) {
                names.push(entry.file_name());
            } else {
                debug!(path = %entry.path().display(), "Skipping non-image entry");
            }
        }
    }
    names.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for name in &names {
        let bytes = fs::read(images_dir.join(name)).await?;
        zip.start_file(name.to_string_lossy().into_owned(), options)?;
        zip.write_all(&bytes)?;
    }
    let archive = zip.finish()?.into_inner();

    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(FILE_NAME);
    fs::write(&path, archive).await?;
    info!(path = %path.display(), count = names.len(), "Wrote image archive");
    Ok(path)
}
