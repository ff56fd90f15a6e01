use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use serde_json::json;
use tower::{Layer, Service};

/// Replace the bodies of 401, 403, and 500 responses with a generic message.
#[derive(Debug, Clone)]
pub struct ObfuscateErrorLayer {
    enabled: bool,
}

impl ObfuscateErrorLayer {
    pub fn new(enabled: bool) -> ObfuscateErrorLayer {
        ObfuscateErrorLayer { enabled }
    }
}

impl<S> Layer<S> for ObfuscateErrorLayer {
    type Service = ObfuscateError<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObfuscateError {
            inner,
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObfuscateError<S> {
    inner: S,
    enabled: bool,
}

fn obfuscated_message(status: StatusCode) -> Option<(&'static str, &'static str)> {
    match status {
        StatusCode::INTERNAL_SERVER_ERROR => Some(("internal_server_error", "Internal error")),
        StatusCode::UNAUTHORIZED => Some(("authn", "Unauthorized")),
        StatusCode::FORBIDDEN => Some(("forbidden", "Forbidden")),
        _ => None,
    }
}

impl<S> Service<Request<Body>> for ObfuscateError<S>
where
    S: Service<Request<Body>> + Send + 'static,
    S::Future: Send + 'static,
    S::Response: IntoResponse + Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let enabled = self.enabled;
        let fut = self.inner.call(req);
        Box::pin(async move {
            let res = fut.await?.into_response();
            if !enabled {
                return Ok(res);
            }

            let status = res.status();
            let Some((kind, message)) = obfuscated_message(status) else {
                return Ok(res);
            };

            let body = json!({
                "error": {
                    "kind": kind,
                    "message": message,
                }
            });

            Ok((status, Json(body)).into_response())
        })
    }
}
