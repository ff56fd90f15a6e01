use std::path::PathBuf;

use object_store::{local::LocalFileSystem, memory::InMemory, ObjectStore};
use tracing::{event, Level};

use crate::{
    error::{Error, Result},
    operator::Operator,
    s3::S3ProviderConfig,
};

#[derive(Debug, Clone)]
pub enum ProviderConfig {
    /// `base_location` is `bucket` or `bucket/path/prefix`.
    S3 {
        config: S3ProviderConfig,
        base_location: String,
    },
    Local {
        root: PathBuf,
    },
    Memory,
}

impl ProviderConfig {
    /// Build a provider from the name given in configuration.
    pub fn from_name(
        name: &str,
        location: Option<String>,
        s3: S3ProviderConfig,
    ) -> Result<ProviderConfig> {
        match name {
            "local" => Ok(ProviderConfig::Local {
                root: location.ok_or(Error::MissingField("storage_location"))?.into(),
            }),
            "memory" => Ok(ProviderConfig::Memory),
            "s3" => Ok(ProviderConfig::S3 {
                config: s3,
                base_location: location.ok_or(Error::MissingField("storage_location"))?,
            }),
            _ => Err(Error::UnknownStorageType(name.to_string())),
        }
    }

    pub fn create_operator(&self, public_url_base: &str) -> Result<Operator> {
        let (store, path_prefix): (Box<dyn ObjectStore>, Option<String>) = match self {
            Self::S3 {
                config,
                base_location,
            } => {
                let store = crate::s3::create_store(config, base_location)
                    .map_err(|e| Error::Configuration(e.to_string()))?;
                // The bucket is handled by the store, and any remaining path by the Operator.
                let prefix = base_location
                    .split_once('/')
                    .map(|(_, prefix)| prefix.to_string());
                (Box::new(store), prefix)
            }
            Self::Local { root } => {
                std::fs::create_dir_all(root)?;
                let store = LocalFileSystem::new_with_prefix(root)?;
                (Box::new(store), None)
            }
            Self::Memory => (Box::new(InMemory::new()), None),
        };

        event!(Level::INFO, provider=?self, "Created blob storage");
        Ok(Operator::new(store, path_prefix, public_url_base))
    }
}
