use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Password hasher error: {0}")]
    PasswordHasherError(String),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("Invalid format for {0}")]
    IdParseError(&'static str),

    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Malformed authorization header")]
    MalformedAuthorization,
}
