use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(String),

    /// A referenced row does not exist, or does not have the required shape
    /// (e.g. assigning a user who is not a designer).
    #[error("Unknown {0}")]
    MissingReference(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Db(diesel::result::Error),

    #[cfg(feature = "postgres")]
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_diesel::PoolError),
}

#[cfg(feature = "postgres")]
impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match e {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.table_name().unwrap_or("row").to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::MissingReference(
                    info.constraint_name().unwrap_or("reference").to_string(),
                )
            }
            e => StoreError::Db(e),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_diesel::InteractError> for StoreError {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
