use crate::client::HttpClient;
use crate::config::TransportSecurity;
use crate::error::{HttpError, UrlRejection};
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Uri};
use http_body_util::Full;
use tower::ServiceExt;

/// A request being put together; nothing is sent before [`send`](Self::send).
///
/// Header errors are held back and reported by `send`, so calls can be
/// chained without intermediate `?`.
#[must_use = "a request does nothing until .send() is called"]
pub struct RequestBuilder {
    client: HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(client: HttpClient, method: Method, url: &str) -> Self {
        Self {
            client,
            method,
            url: url.to_owned(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Adds a header; repeated names are sent as repeated headers.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_none() {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    self.headers.append(name, value);
                }
                (Err(e), _) => self.error = Some(e.into()),
                (_, Err(e)) => self.error = Some(e.into()),
            }
        }
        self
    }

    /// Sets the body and its `Content-Type`, replacing any earlier one.
    pub fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.headers.remove(CONTENT_TYPE);
        self.body = body.into();
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Sends the request and waits for the response head.
    ///
    /// # Errors
    /// - [`HttpError::InvalidHeader`] for a header added earlier
    /// - [`HttpError::InvalidUrl`] if the URL is refused by [`check_url`]
    /// - [`HttpError::Timeout`] or [`HttpError::Transport`] if no response
    ///   arrives
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = check_url(&self.url, self.client.transport_security)?;
        let mut request = Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(self.body))?;
        *request.headers_mut() = self.headers;

        tracing::trace!(method = %request.method(), url = %self.url, "sending request");
        let inner = self.client.service.oneshot(request).await?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.client.max_body_size,
        })
    }
}

/// Parses `url` and checks it may be requested under `security`.
///
/// # Errors
/// Returns [`HttpError::InvalidUrl`] for anything but an absolute `https`
/// URL, or an absolute `http` URL when insecure HTTP is allowed.
pub fn check_url(url: &str, security: TransportSecurity) -> Result<Uri, HttpError> {
    let reject = |rejection| HttpError::InvalidUrl {
        url: url.to_owned(),
        rejection,
    };

    let uri: Uri = url
        .parse()
        .map_err(|e: http::uri::InvalidUri| reject(UrlRejection::Malformed(e.to_string())))?;
    if uri.authority().is_none() {
        return Err(reject(UrlRejection::NotAbsolute));
    }

    match (uri.scheme_str(), security) {
        (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
        (Some("http"), TransportSecurity::TlsOnly) => Err(reject(UrlRejection::InsecureScheme)),
        (Some(other), _) => Err(reject(UrlRejection::UnsupportedScheme(other.to_owned()))),
        (None, _) => Err(reject(UrlRejection::NotAbsolute)),
    }
}
