use std::fmt;
use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a request URL was refused before anything went on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UrlRejection {
    /// Not parsable as a URI.
    Malformed(String),
    /// Scheme or host missing. Relation paths must be joined onto the API
    /// base URL before they reach the transport.
    NotAbsolute,
    /// Anything but `http` and `https`.
    UnsupportedScheme(String),
    /// `http://` on a client that only speaks TLS.
    InsecureScheme,
}

impl fmt::Display for UrlRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed URL ({reason})"),
            Self::NotAbsolute => f.write_str("URL must carry a scheme and a host"),
            Self::UnsupportedScheme(scheme) => {
                write!(f, "scheme '{scheme}' is not supported, use http or https")
            }
            Self::InsecureScheme => {
                f.write_str("plain http is disabled, enable insecure HTTP to allow it")
            }
        }
    }
}

/// Failures that leave the caller without an HTTP response.
///
/// Error statuses are not errors here; they come back as responses.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("refusing to request '{url}': {rejection}")]
    InvalidUrl { url: String, rejection: UrlRejection },

    /// Header name or value that cannot go on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(#[source] BoxError),

    #[error("failed to assemble request: {0}")]
    Request(#[from] http::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// Connection, protocol or body stream failure.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] BoxError),

    /// Counted after decompression.
    #[error("response body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },
}

impl From<http::header::InvalidHeaderName> for HttpError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        HttpError::InvalidHeader(Box::new(err))
    }
}

impl From<http::header::InvalidHeaderValue> for HttpError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        HttpError::InvalidHeader(Box::new(err))
    }
}
