use crate::config::HalClientConfig;
use crate::error::HalError;
use crate::navigator::HalNavigator;
use hal_http::{HttpClient, HttpClientBuilder};

/// Navigator over the real HTTP transport.
pub type HalClient = HalNavigator<HttpClient>;

impl HalNavigator<HttpClient> {
    /// Builds the transport described by `config` and a navigator rooted at
    /// `config.base_url`.
    ///
    /// Unusable credential options are logged and ignored.
    ///
    /// # Errors
    /// - [`HalError::InvalidBaseUrl`] if the base URL is not absolute http(s)
    /// - [`HalError::Transport`] if the HTTP client cannot be built
    pub fn from_config(config: &HalClientConfig) -> Result<Self, HalError> {
        let mut builder = HttpClientBuilder::new(config.http_config());
        if let Some(credentials) = config.credentials() {
            builder = credentials.apply(builder);
        }
        let transport = builder.build()?;

        tracing::debug!(base_url = %config.base_url, "HAL client created");
        Self::new(&config.base_url, transport)
    }
}
