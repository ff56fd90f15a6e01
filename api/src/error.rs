use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use project_board_db::StoreError;
use project_board_http_errors::ErrorResponseData;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: Cow<'static, str>,
    },

    #[error("{0} already exists")]
    Conflict(String),

    #[error("Unknown {0}")]
    MissingReference(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] project_board_storage::Error),

    #[error("Timed out waiting for the store")]
    Timeout,

    #[error("Not found")]
    NotFound,

    #[error("Unknown {0}")]
    ObjectNotFound(&'static str),

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Auth error: {0}")]
    Auth(#[from] project_board_auth::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Server error: {0}")]
    ServerError(#[from] hyper::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<Cow<'static, str>>) -> Error {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn error_kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Conflict(_) => "conflict",
            Error::MissingReference(_) => "missing_reference",
            Error::Store(_) => "store",
            Error::Storage(project_board_storage::Error::AlreadyExists(_)) => "conflict",
            Error::Storage(_) => "storage",
            Error::Timeout => "timeout",
            Error::NotFound => "not_found",
            Error::ObjectNotFound(_) => "not_found",
            Error::Unauthenticated => "authn",
            Error::Forbidden => "forbidden",
            Error::InvalidCredentials => "authn",
            Error::Auth(project_board_auth::Error::PasswordHasherError(_)) => {
                "internal_server_error"
            }
            Error::Auth(_) => "authn",
            Error::BadRequest(_) => "bad_request",
            Error::Multipart(_) => "bad_request",
            Error::ServerError(_) => "internal_server_error",
            Error::Internal(_) => "internal_server_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::MissingReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Storage(project_board_storage::Error::AlreadyExists(_)) => StatusCode::CONFLICT,
            Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::ObjectNotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Auth(project_board_auth::Error::PasswordHasherError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn response_tuple(&self) -> (StatusCode, ErrorResponseData) {
        let data = ErrorResponseData::new(self.error_kind(), self.to_string());
        let data = match self {
            Error::Validation { field, .. } => data.with_field(*field),
            _ => data,
        };

        (self.status_code(), data)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => Error::Conflict(what),
            StoreError::MissingReference(what) => Error::MissingReference(what),
            e => Error::Store(e),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (code, data) = self.response_tuple();
        data.into_response_with_status(code)
    }
}
