//! The HTTP capability consumed by the navigator.

use async_trait::async_trait;
use bytes::Bytes;
use hal_http::{HttpClient, HttpError, HttpResponse};
use http::{HeaderMap, StatusCode, Version};
use std::borrow::Cow;

/// `Accept` header sent with every HAL fetch.
pub const HAL_ACCEPT: &str = "application/hal+json, application/json";

/// HAL media type.
pub const HAL_JSON: &str = "application/hal+json";

/// Content type of JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status, headers and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// HTTP/1.1 response with an empty header map.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Raw `Content-Type` value, if present and valid UTF-8.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// `"<code> <reason>"`, e.g. `"409 Conflict"`.
    #[must_use]
    pub fn status_reason(&self) -> String {
        match self.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", self.status.as_u16()),
            None => self.status.as_u16().to_string(),
        }
    }

    /// `"<version> <code> <reason>"`, e.g. `"HTTP/1.1 200 OK"`.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{} {}", version_label(self.version), self.status_reason())
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// First line of the body; empty for an empty body.
    #[must_use]
    pub fn first_line(&self) -> String {
        self.text().lines().next().unwrap_or_default().to_owned()
    }

    /// Whether the declared content type is any JSON media type
    /// (`application/json`, `application/hal+json`, `*/*+json`).
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(is_json_media_type)
    }

    /// Whether the declared content type is one a HAL document may be served
    /// with: `application/json` or `application/hal+json`, parameters ignored.
    #[must_use]
    pub fn is_hal(&self) -> bool {
        self.content_type().is_some_and(is_hal_media_type)
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/1.1",
    }
}

/// `application/json` or `application/hal+json`; parameters such as `charset`
/// are ignored. Unparsable values are rejected.
#[must_use]
pub fn is_hal_media_type(content_type: &str) -> bool {
    content_type.parse::<mime::Mime>().is_ok_and(|mime| {
        let essence = mime.essence_str();
        essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE) || essence.eq_ignore_ascii_case(HAL_JSON)
    })
}

/// Any JSON media type, including structured-syntax `+json` suffixes.
#[must_use]
pub fn is_json_media_type(content_type: &str) -> bool {
    content_type.parse::<mime::Mime>().is_ok_and(|mime| {
        mime.type_() == mime::APPLICATION
            && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
    })
}

/// HTTP operations the navigator needs.
///
/// Implementations return every HTTP status as a [`TransportResponse`];
/// `Err` means no response was obtained.
#[async_trait]
pub trait HalTransport: Send + Sync {
    /// GET `url` with the given extra headers.
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, HttpError>;

    /// PUT `body` to `url`.
    async fn put(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError>;

    /// POST `body` to `url`.
    async fn post(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError>;
}

#[async_trait]
impl HalTransport for HttpClient {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, HttpError> {
        let mut request = HttpClient::get(self, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        read_response(request.send().await?).await
    }

    async fn put(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError> {
        let response = HttpClient::put(self, url)
            .header(http::header::ACCEPT.as_str(), HAL_ACCEPT)
            .body(content_type, body)
            .send()
            .await?;
        read_response(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError> {
        let response = HttpClient::post(self, url)
            .header(http::header::ACCEPT.as_str(), HAL_ACCEPT)
            .body(content_type, body)
            .send()
            .await?;
        read_response(response).await
    }
}

async fn read_response(response: HttpResponse) -> Result<TransportResponse, HttpError> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    Ok(TransportResponse {
        status,
        version,
        headers,
        body,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn with_content_type(content_type: &'static str) -> TransportResponse {
        let mut response = TransportResponse::new(StatusCode::OK, "");
        response.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        response
    }

    #[test]
    fn hal_media_types() {
        assert!(is_hal_media_type("application/json"));
        assert!(is_hal_media_type("application/hal+json"));
        assert!(is_hal_media_type("application/hal+json;charset=UTF-8"));
        assert!(is_hal_media_type("Application/JSON; charset=utf-8"));
        assert!(!is_hal_media_type("text/plain"));
        assert!(!is_hal_media_type("text/html; charset=utf-8"));
        assert!(!is_hal_media_type("application/problem+json"));
        assert!(!is_hal_media_type("not a media type"));
    }

    #[test]
    fn json_media_types() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/hal+json"));
        assert!(is_json_media_type("application/problem+json; charset=utf-8"));
        assert!(!is_json_media_type("text/plain"));
        assert!(!is_json_media_type("text/json+html"));
    }

    #[test]
    fn status_line_and_reason() {
        let ok = TransportResponse::new(StatusCode::OK, "");
        assert_eq!(ok.status_line(), "HTTP/1.1 200 OK");

        let mut created = TransportResponse::new(StatusCode::CREATED, "");
        created.version = Version::HTTP_2;
        assert_eq!(created.status_line(), "HTTP/2 201 Created");

        let conflict = TransportResponse::new(StatusCode::CONFLICT, "");
        assert_eq!(conflict.status_reason(), "409 Conflict");

        let custom = TransportResponse::new(StatusCode::from_u16(599).unwrap(), "");
        assert_eq!(custom.status_reason(), "599");
    }

    #[test]
    fn first_line_of_body() {
        let response = TransportResponse::new(StatusCode::CONFLICT, "name already exists\nmore detail");
        assert_eq!(response.first_line(), "name already exists");
        assert_eq!(TransportResponse::new(StatusCode::CONFLICT, "").first_line(), "");
        assert_eq!(
            TransportResponse::new(StatusCode::CONFLICT, "windows\r\nline").first_line(),
            "windows"
        );
    }

    #[test]
    fn content_type_classification() {
        let hal = with_content_type("application/hal+json");
        assert!(hal.is_hal());
        assert!(hal.is_json());

        let plain = with_content_type("text/plain");
        assert!(!plain.is_hal());
        assert!(!plain.is_json());
        assert_eq!(plain.content_type(), Some("text/plain"));

        let none = TransportResponse::new(StatusCode::OK, "{}");
        assert!(!none.is_hal());
        assert_eq!(none.content_type(), None);
    }
}
