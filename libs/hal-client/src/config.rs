use crate::error::HalError;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use hal_http::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, HttpClientBuilder,
    HttpClientConfig, SecretString, TransportSecurity,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of environment variables that override file configuration.
pub const ENV_PREFIX: &str = "HAL_CLIENT_";

/// Client configuration.
///
/// Loaded in layers: defaults, then an optional YAML file, then
/// `HAL_CLIENT_*` environment variables.
///
/// ```yaml
/// base_url: https://broker.example.com
/// auth: [basic, broker, s3cret]
/// request_timeout: 10s
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HalClientConfig {
    /// Root of the HAL API.
    pub base_url: String,

    /// `[scheme, username, password]` for basic auth or `[bearer, token]`.
    pub auth: Option<Vec<String>>,

    /// Per-request timeout (default: 30s).
    #[serde(with = "humantime_duration")]
    pub request_timeout: Duration,

    /// User-Agent header (default: the transport's own).
    pub user_agent: Option<String>,

    /// Maximum response body size in bytes (default: 10 MB).
    pub max_body_size: usize,

    /// Allow plain `http://` base URLs.
    pub allow_insecure_http: bool,
}

impl Default for HalClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: None,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            allow_insecure_http: false,
        }
    }
}

impl std::fmt::Debug for HalClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalClientConfig")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("user_agent", &self.user_agent)
            .field("max_body_size", &self.max_body_size)
            .field("allow_insecure_http", &self.allow_insecure_http)
            .finish()
    }
}

impl HalClientConfig {
    /// Configuration for `base_url` with every other setting at its default.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// The layered provider stack; exposed so callers can merge extra
    /// providers before extracting.
    ///
    /// A missing YAML file contributes nothing.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    /// Returns [`HalError::Config`] if a layer cannot be parsed or contains
    /// unknown keys.
    pub fn load(path: Option<&Path>) -> Result<Self, HalError> {
        Self::from_figment(&Self::figment(path))
    }

    /// # Errors
    /// Returns [`HalError::Config`] if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, HalError> {
        figment
            .extract()
            .map_err(|e| HalError::Config(Box::new(e)))
    }

    /// Credentials parsed from [`auth`](Self::auth).
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.auth.as_deref().and_then(Credentials::from_options)
    }

    /// Transport settings derived from this configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.request_timeout,
            max_body_size: self.max_body_size,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
        }
    }
}

/// Credentials sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic {
        username: String,
        password: SecretString,
    },
    Bearer(SecretString),
}

impl Credentials {
    /// Parses an ordered option list.
    ///
    /// Accepts `[basic, username, password]` and `[bearer, token]`, scheme
    /// matched case-insensitively. Anything else logs a warning and yields
    /// `None`; the client then runs unauthenticated.
    #[must_use]
    pub fn from_options(options: &[String]) -> Option<Self> {
        match options {
            [scheme, username, password] if scheme.eq_ignore_ascii_case("basic") => {
                Some(Self::Basic {
                    username: username.clone(),
                    password: SecretString::new(password.as_str()),
                })
            }
            [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => {
                Some(Self::Bearer(SecretString::new(token.as_str())))
            }
            [scheme, rest @ ..] => {
                tracing::warn!(
                    scheme = %scheme,
                    values = rest.len(),
                    "unsupported authentication scheme or malformed credentials, continuing without authentication"
                );
                None
            }
            [] => {
                tracing::warn!("empty authentication options, continuing without authentication");
                None
            }
        }
    }

    /// Installs these credentials on a transport builder.
    #[must_use]
    pub fn apply(&self, builder: HttpClientBuilder) -> HttpClientBuilder {
        match self {
            Self::Basic { username, password } => {
                builder.basic_auth(username.as_str(), password.clone())
            }
            Self::Bearer(token) => builder.bearer_auth(token.clone()),
        }
    }
}

/// `Duration` as a humantime string (`"30s"`, `"1m 30s"`).
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
