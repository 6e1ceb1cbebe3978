#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for the HAL hypermedia client.
//!
//! A hyper client over rustls, assembled from tower layers:
//!
//! ```text
//! Timeout -> default headers (User-Agent, Authorization) -> decompression -> hyper
//! ```
//!
//! Every HTTP status comes back as an [`HttpResponse`]; the HAL layer above
//! decides what 404 or 409 mean. [`HttpError`] is reserved for requests that
//! produced no response at all.
//!
//! ```ignore
//! use hal_http::{HttpClientBuilder, HttpClientConfig, SecretString};
//!
//! let client = HttpClientBuilder::new(HttpClientConfig::default())
//!     .basic_auth("broker", SecretString::new("secret"))
//!     .build()?;
//! let resp = client
//!     .get("https://broker.example.com/")
//!     .header("accept", "application/hal+json, application/json")
//!     .send()
//!     .await?;
//! let status = resp.status();
//! let body = resp.bytes().await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod headers;
mod request;
mod response;
mod secret;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT, HttpClientConfig,
    TransportSecurity,
};
pub use error::{HttpError, UrlRejection};
pub use request::{RequestBuilder, check_url};
pub use response::HttpResponse;
pub use secret::SecretString;
