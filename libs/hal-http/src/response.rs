use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode, Version};
use http_body_util::BodyExt;

/// Boxed, already decompressed response body.
pub(crate) type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// A received response whose body has not been read yet.
///
/// The status is never checked here; 404, 409 and 5xx responses are as
/// meaningful to the navigator as 200.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Reads the whole body.
    ///
    /// # Errors
    /// - [`HttpError::BodyTooLarge`] once more than the configured limit
    ///   has arrived
    /// - [`HttpError::Transport`] if the body stream breaks off
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        let limit = self.max_body_size;
        let mut body = std::pin::pin!(self.inner.into_body());
        let mut collected = Vec::new();

        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(HttpError::Transport)?;
            if let Some(chunk) = frame.data_ref() {
                if collected.len() + chunk.len() > limit {
                    return Err(HttpError::BodyTooLarge { limit });
                }
                collected.extend_from_slice(chunk);
            }
        }

        Ok(Bytes::from(collected))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: u16, body: &str, limit: usize) -> HttpResponse {
        let body: ResponseBody = Full::new(Bytes::from(body.to_owned()))
            .map_err(Into::into)
            .boxed();
        HttpResponse {
            inner: Response::builder().status(status).body(body).unwrap(),
            max_body_size: limit,
        }
    }

    #[tokio::test]
    async fn conflict_body_is_readable() {
        let resp = response(409, "name already exists", 64);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(resp.version(), Version::HTTP_11);
        assert_eq!(resp.bytes().await.unwrap(), "name already exists");
    }

    #[tokio::test]
    async fn body_exactly_at_limit_is_accepted() {
        let resp = response(200, &"x".repeat(64), 64);
        assert_eq!(resp.bytes().await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let resp = response(200, &"x".repeat(65), 64);
        assert!(matches!(
            resp.bytes().await,
            Err(HttpError::BodyTooLarge { limit: 64 })
        ));
    }
}
