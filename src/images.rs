//! Article image download with per-run deduplication.
//!
//! [`ImageFetcher`] remembers every reference it has stored during the run
//! and hands back the cached path on repeat requests. Failed downloads are
//! not remembered, so a later article with the same reference tries again.

use crate::error::{Error, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Where image bytes come from and where they are kept.
pub trait ImageStore {
    /// Retrieve the image behind `reference`.
    async fn download(&self, reference: &str) -> Result<Vec<u8>>;

    /// Allocate a local path for `reference` and write `bytes` there.
    async fn persist(&mut self, reference: &str, bytes: &[u8]) -> Result<PathBuf>;
}

#[derive(Debug)]
pub struct ImageFetcher<S> {
    store: S,
    cache: HashMap<String, PathBuf>,
}

impl<S: ImageStore> ImageFetcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Number of distinct images stored so far.
    pub fn stored(&self) -> usize {
        self.cache.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Download and store the image at `reference`, once per run.
    ///
    /// A repeat reference returns the path stored the first time without
    /// touching the store. Failures are not cached.
    ///
    /// # Returns
    ///
    /// The local path, or [`Error::FetchFailure`] if the download or write
    /// failed.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&mut self, reference: &str) -> Result<PathBuf> {
        if let Some(path) = self.cache.get(reference) {
            debug!(path = %path.display(), "Image already fetched this run");
            return Ok(path.clone());
        }

        let bytes = self.store.download(reference).await?;
        let path = self.store.persist(reference, &bytes).await?;
        info!(bytes = bytes.len(), path = %path.display(), "Stored image");
        self.cache.insert(reference.to_string(), path.clone());
        Ok(path)
    }
}

/// Downloads over HTTP and writes `image_{n}.{ext}` files into one directory.
#[derive(Debug)]
pub struct DiskImageStore {
    client: Client,
    dir: PathBuf,
    next_index: usize,
}

impl DiskImageStore {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::FetchFailure {
                reference: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            dir: dir.into(),
            next_index: 1,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn allocate(&mut self, reference: &str) -> PathBuf {
        let name = format!("image_{}.{}", self.next_index, extension_of(reference));
        self.next_index += 1;
        self.dir.join(name)
    }
}

impl ImageStore for DiskImageStore {
    async fn download(&self, reference: &str) -> Result<Vec<u8>> {
        let failure = |e: reqwest::Error| Error::FetchFailure {
            reference: reference.to_string(),
            reason: e.to_string(),
        };
        let bytes = self
            .client
            .get(reference)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(failure)?
            .bytes()
            .await
            .map_err(failure)?;
        Ok(bytes.to_vec())
    }

    async fn persist(&mut self, reference: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.allocate(reference);
        let written = async {
            fs::create_dir_all(&self.dir).await?;
            fs::write(&path, bytes).await
        };
        if let Err(e) = written.await {
            warn!(path = %path.display(), error = %e, "Failed to write image");
            return Err(Error::FetchFailure {
                reference: reference.to_string(),
                reason: e.to_string(),
            });
        }
        Ok(path)
    }
}

/// File extension taken from the reference's URL path, `jpg` when absent.
fn extension_of(reference: &str) -> String {
    Url::parse(reference)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|ext| matches!(ext.as_str(), "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp"))
        .unwrap_or_else(|| "jpg".to_string())
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryImageStore;
    use super::*;

    #[tokio::test]
    async fn test_same_reference_fetched_once() {
        let mut fetcher = ImageFetcher::new(MemoryImageStore::default());
        let first = fetcher.fetch("https://img.example.com/a.jpg").await.unwrap();
        let second = fetcher.fetch("https://img.example.com/a.jpg").await.unwrap();
        let other = fetcher.fetch("https://img.example.com/b.jpg").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(fetcher.stored(), 2);
        assert_eq!(fetcher.store().persisted_refs.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let mut fetcher =
            ImageFetcher::new(MemoryImageStore::failing_on(&["https://img.example.com/x.jpg"]));
        let err = fetcher.fetch("https://img.example.com/x.jpg").await.unwrap_err();
        assert!(matches!(err, Error::FetchFailure { .. }));
        assert_eq!(fetcher.stored(), 0);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("https://img.example.com/a/photo.PNG"), "png");
        assert_eq!(extension_of("https://img.example.com/a/photo.webp?w=600"), "webp");
        assert_eq!(extension_of("https://img.example.com/resize?id=42"), "jpg");
        assert_eq!(extension_of("not a url"), "jpg");
    }

    #[tokio::test]
    async fn test_disk_store_allocates_sequential_names() {
        let dir = std::env::temp_dir().join(format!("news_crawler_images_{}", std::process::id()));
        let mut store =
            DiskImageStore::new(&dir, Duration::from_secs(5), "news_crawler-test").unwrap();

        let a = store.persist("https://img.example.com/a.png", b"png").await.unwrap();
        let b = store.persist("https://img.example.com/b", b"jpg").await.unwrap();

        assert_eq!(a, dir.join("image_1.png"));
        assert_eq!(b, dir.join("image_2.jpg"));
        assert_eq!(fs::read(&a).await.unwrap(), b"png");

        let _ = fs::remove_dir_all(store.dir()).await;
    }
}
