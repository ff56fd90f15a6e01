use http::uri::InvalidUri;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown storage type {0}")]
    UnknownStorageType(String),

    #[error(transparent)]
    InvalidUri(#[from] InvalidUri),

    #[error("Missing field {0}")]
    MissingField(&'static str),

    #[error("Configuring storage: {0}")]
    Configuration(String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] object_store::path::Error),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),

    #[error("Creating storage directory: {0}")]
    Io(#[from] std::io::Error),
}
