use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::Error;

/// Get the token from an `Authorization: Bearer <token>` header, if there is one.
pub fn extract_bearer_auth_value(headers: &HeaderMap) -> Result<Option<String>, Error> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let (auth_type, token) = value
                .to_str()
                .map_err(|_| Error::MalformedAuthorization)?
                .split_once(' ')
                .ok_or(Error::MalformedAuthorization)?;

            if auth_type != "Bearer" {
                return Err(Error::MalformedAuthorization);
            }

            Ok(Some(token.trim().to_string()))
        }
    }
}
