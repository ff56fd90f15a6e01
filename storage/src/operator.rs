use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;
use object_store::{path::Path, GetResult, ObjectStore};
use tracing::{event, instrument, Level};

use crate::{
    blob_store::{BlobStore, UploadOptions},
    error::{Error, Result},
};

/// A [BlobStore] over any [ObjectStore], with an optional path prefix inside the
/// store and the base URL at which stored blobs are served.
#[derive(Debug)]
pub struct Operator {
    pub operator: Box<dyn ObjectStore>,
    pub path_prefix: Option<String>,
    pub public_url_base: String,
}

impl Operator {
    pub fn new(
        operator: Box<dyn ObjectStore>,
        path_prefix: Option<String>,
        public_url_base: impl Into<String>,
    ) -> Self {
        Operator {
            operator,
            path_prefix: path_prefix.filter(|p| !p.trim_matches('/').is_empty()),
            public_url_base: public_url_base.into(),
        }
    }

    fn make_full_path(&self, location: &str) -> Result<Path> {
        let location = location.trim_start_matches('/');
        let path = match &self.path_prefix {
            Some(prefix) => Path::parse(format!("{}/{}", prefix.trim_matches('/'), location))?,
            None => Path::parse(location)?,
        };

        Ok(path)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, location: &str) -> Result<GetResult> {
        let p = self.make_full_path(location)?;
        self.operator.get(&p).await.map_err(Error::from)
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn put(&self, location: &str, bytes: Bytes) -> Result<()> {
        let p = self.make_full_path(location)?;
        self.operator.put(&p, bytes).await.map_err(Error::from)
    }

    pub async fn exists(&self, location: &str) -> Result<bool> {
        let p = self.make_full_path(location)?;
        match self.operator.head(&p).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob. A missing blob is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, location: &str) -> Result<()> {
        // LocalFileSystem reports deleting a missing file as a generic error, but `head`
        // gives NotFound on every store.
        if !self.exists(location).await? {
            return Ok(());
        }

        let p = self.make_full_path(location)?;
        match self.operator.delete(&p).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl BlobStore for Operator {
    async fn upload(&self, path: &str, bytes: Bytes, options: UploadOptions) -> Result<()> {
        if !options.upsert && self.exists(path).await? {
            return Err(Error::AlreadyExists(path.to_string()));
        }

        self.put(path, bytes).await
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        event!(Level::DEBUG, count = paths.len(), "Removing blobs");
        try_join_all(paths.iter().map(|p| self.delete(p))).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_url_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
