use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Overwrite an existing blob at the same path. When false, an existing blob
    /// fails the upload with [crate::Error::AlreadyExists].
    pub upsert: bool,
}

/// Where project file blobs live.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    async fn upload(&self, path: &str, bytes: Bytes, options: UploadOptions) -> Result<()>;

    /// Remove the blobs at `paths`. Paths that don't exist are not an error.
    async fn remove(&self, paths: &[String]) -> Result<()>;

    /// The URL at which the blob at `path` is served.
    fn public_url(&self, path: &str) -> String;
}
