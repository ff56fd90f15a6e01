mod blob_store;
mod error;
mod operator;
mod provider;
mod s3;

pub use blob_store::*;
pub use error::*;
pub use operator::*;
pub use provider::*;
pub use s3::S3ProviderConfig;
