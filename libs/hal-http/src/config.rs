use std::time::Duration;

/// Sent when the caller configures no User-Agent of its own.
pub const DEFAULT_USER_AGENT: &str = concat!("hal-http/", env!("CARGO_PKG_VERSION"));

/// 10 MB; HAL index documents of large APIs stay well below this.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether plain `http://` URLs may be requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// API servers on internal networks often run without TLS; this has to
    /// be switched on explicitly and is logged when the client is built.
    AllowInsecureHttp,
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Covers connect, request and response headers.
    pub request_timeout: Duration,
    /// Limit on the decompressed response body.
    pub max_body_size: usize,
    pub user_agent: String,
    pub transport: TransportSecurity,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
        }
    }
}
