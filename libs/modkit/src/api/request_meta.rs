use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;

/// Request header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request facts used when rendering a problem response.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Request path, used as the problem `instance`.
    pub path: String,
    /// Correlation id from `x-request-id`, when present.
    pub request_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Ok(Self {
            path: parts.uri.path().to_owned(),
            request_id,
        })
    }
}
