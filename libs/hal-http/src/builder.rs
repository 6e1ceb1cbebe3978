use crate::client::{HttpClient, HttpService};
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::headers::{DefaultHeadersLayer, basic_authorization, bearer_authorization};
use crate::response::ResponseBody;
use crate::secret::SecretString;
use bytes::Bytes;
use http::header::{AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue, Response};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::sync::Arc;
use std::time::Duration;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;

/// A navigation session sends one request at a time to one host.
const POOL_MAX_IDLE_PER_HOST: usize = 1;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Credentials {
    Basic {
        username: String,
        password: SecretString,
    },
    Bearer(SecretString),
}

/// Assembles an [`HttpClient`] from an [`HttpClientConfig`] and optional
/// credentials.
#[must_use]
#[derive(Debug)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    credentials: Option<Credentials>,
}

impl HttpClientBuilder {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
            credentials: None,
        }
    }

    /// Sends `Authorization: Basic ...`; replaces earlier credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.credentials = Some(Credentials::Basic {
            username: username.into(),
            password,
        });
        self
    }

    /// Sends `Authorization: Bearer ...`; replaces earlier credentials.
    pub fn bearer_auth(mut self, token: SecretString) -> Self {
        self.credentials = Some(Credentials::Bearer(token));
        self
    }

    /// # Errors
    /// - [`HttpError::Tls`] if the rustls connector cannot be set up
    /// - [`HttpError::InvalidHeader`] if the user agent or credentials are not
    ///   valid header values
    pub fn build(self) -> Result<HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                "insecure HTTP enabled: requests and credentials to http:// URLs travel unencrypted"
            );
        }

        let defaults = self.default_headers()?;
        let timeout = self.config.request_timeout;

        // pool_timer is needed for the idle timeout to fire
        let hyper_client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .build::<_, Full<Bytes>>(https_connector(self.config.transport)?);

        // Timeout -> default headers -> decompression -> hyper
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(DefaultHeadersLayer::new(defaults))
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(box_body)
            .map_err(move |e: tower::BoxError| classify_error(e, timeout));

        Ok(HttpClient {
            service: HttpService::new(service),
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
        })
    }

    fn default_headers(&self) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);
        match &self.credentials {
            Some(Credentials::Basic { username, password }) => {
                headers.insert(AUTHORIZATION, basic_authorization(username, password)?);
            }
            Some(Credentials::Bearer(token)) => {
                headers.insert(AUTHORIZATION, bearer_authorization(token)?);
            }
            None => {}
        }
        Ok(headers)
    }
}

/// Mozilla roots; plain `http` is only dialled when insecure HTTP is allowed.
///
/// Prefers a process-wide rustls provider if one is installed and falls back
/// to aws-lc-rs otherwise.
fn https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
    let builder = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    Ok(match transport {
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
    })
}

fn classify_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(err) => *err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_body<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    response.map(|body| body.map_err(Into::into).boxed())
}
