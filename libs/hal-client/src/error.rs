use hal_http::HttpError;
use http::StatusCode;
use thiserror::Error;

/// Errors raised while navigating a HAL API.
///
/// Write operations report HTTP-level failures through
/// [`Outcome`](crate::Outcome) instead; they only return `HalError` when no
/// HTTP response was obtained at all.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// The resource at `path` answered with HTTP 404.
    #[error("no resource found at {base_url} for path '{path}' (404 Not Found)")]
    NotFoundResponse { base_url: String, path: String },

    /// The response is not a HAL/JSON document, or it lacks `_links` where
    /// navigation needs them.
    #[error("invalid response from {base_url} for path '{path}': {reason}")]
    InvalidResponse {
        base_url: String,
        path: String,
        content_type: Option<String>,
        reason: String,
    },

    /// The relation cannot be followed from the current document.
    #[error("cannot navigate to '{relation}': {reason}")]
    InvalidNavigation { relation: String, reason: String },

    /// A HAL resource fetch answered with a non-404 error status.
    #[error("request for '{path}' failed with {status}: {body}")]
    RequestFailed {
        status: StatusCode,
        path: String,
        body: String,
    },

    /// The body was declared as JSON but could not be parsed (or a request
    /// body could not be serialized).
    #[error("invalid JSON for '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[source] Box<figment::Error>),

    /// Transport-level failure, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] HttpError),
}

impl HalError {
    /// Returns `true` for [`HalError::NotFoundResponse`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundResponse { .. })
    }
}
