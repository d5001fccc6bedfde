//! Resource retrieval.
//!
//! The router reads view bytes through the [`ResourceFetcher`] seam;
//! [`UrlFetcher`] is the stock implementation covering remote and local
//! views by URL scheme.

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::get as reqwest_get;
use tokio::fs::read as tokio_fs_read;
use tokio_stream::StreamExt as _;
use url::Url;

/// Retrieves the textual content of a view resource.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `url` and return its content as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be retrieved or is not valid
    /// UTF-8.
    async fn fetch_text(&self, url: &Url) -> Result<String, Error>;
}

#[async_trait]
impl<T: ResourceFetcher + ?Sized> ResourceFetcher for std::sync::Arc<T> {
    async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        (**self).fetch_text(url).await
    }
}

/// Scheme-dispatching fetcher.
///
/// Supported URL schemes:
/// - `http`, `https`: fetched via `reqwest` as a streaming response
/// - `file`: read from the local filesystem
#[derive(Debug, Default)]
pub struct UrlFetcher;

#[async_trait]
impl ResourceFetcher for UrlFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        let bytes = match url.scheme() {
            "http" | "https" => {
                let response = reqwest_get(url.clone())
                    .await
                    .map_err(|err| anyhow!("Failed to fetch URL {url}: {err}"))?;

                if !response.status().is_success() {
                    return Err(anyhow!(
                        "Failed to fetch URL: {} (Status: {})",
                        url,
                        response.status()
                    ));
                }
                let mut stream = response.bytes_stream();
                let mut buffer = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk?);
                }
                buffer.freeze().to_vec()
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| anyhow!("Invalid file path for file url: {url}"))?;
                tokio_fs_read(path).await?
            }
            _ => return Err(anyhow!("Unsupported url scheme {}", url.scheme())),
        };
        String::from_utf8(bytes).map_err(|err| anyhow!("View at {url} is not UTF-8: {err}"))
    }
}
