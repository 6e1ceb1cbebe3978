//! In-memory transport for navigator unit tests.

use crate::transport::{HalTransport, TransportResponse};
use async_trait::async_trait;
use hal_http::HttpError;
use http::{HeaderValue, Method, StatusCode};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

pub const BASE_URL: &str = "http://broker.test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Answers requests from a fixed script keyed by method and URL.
///
/// Unscripted requests fail with a transport error.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<(Method, String), TransportResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `method path` relative to [`BASE_URL`].
    pub fn respond(
        self,
        method: Method,
        path: &str,
        status: u16,
        content_type: Option<&'static str>,
        body: &str,
    ) -> Self {
        let mut response = TransportResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body.to_owned(),
        );
        if let Some(ct) = content_type {
            response
                .headers
                .insert(http::header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        self.responses
            .lock()
            .insert((method, format!("{BASE_URL}{path}")), response);
        self
    }

    /// Scripts a `200 application/hal+json` GET.
    pub fn hal(self, path: &str, document: &Value) -> Self {
        self.respond(
            Method::GET,
            path,
            200,
            Some("application/hal+json"),
            &document.to_string(),
        )
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.url.clone()).collect()
    }

    fn answer(
        &self,
        method: Method,
        url: &str,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> Result<TransportResponse, HttpError> {
        self.requests.lock().push(RecordedRequest {
            method: method.clone(),
            url: url.to_owned(),
            headers,
            body,
        });
        self.responses
            .lock()
            .get(&(method.clone(), url.to_owned()))
            .cloned()
            .ok_or_else(|| HttpError::Transport(format!("no scripted response for {method} {url}").into()))
    }
}

#[async_trait]
impl HalTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, HttpError> {
        let headers = headers
            .iter()
            .map(|(n, v)| ((*n).to_owned(), (*v).to_owned()))
            .collect();
        self.answer(Method::GET, url, headers, None)
    }

    async fn put(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError> {
        let headers = vec![("content-type".to_owned(), content_type.to_owned())];
        self.answer(Method::PUT, url, headers, Some(body))
    }

    async fn post(
        &self,
        url: &str,
        body: String,
        content_type: &str,
    ) -> Result<TransportResponse, HttpError> {
        let headers = vec![("content-type".to_owned(), content_type.to_owned())];
        self.answer(Method::POST, url, headers, Some(body))
    }
}
