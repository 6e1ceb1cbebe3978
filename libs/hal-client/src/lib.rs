#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Client for HAL+JSON hypermedia APIs
//!
//! Starting from an API root, the client discovers endpoints through the
//! `_links` relations of each response instead of hardcoding paths:
//!
//! - **Navigation**: follow a relation by name, disambiguating list-valued
//!   relations by entry `name` and expanding `{placeholder}` hrefs
//! - **Writes**: `PUT`/`POST` JSON to explicit paths, classified into
//!   [`Outcome::Success`], [`Outcome::Conflict`] or [`Outcome::Failure`]
//! - **Errors**: 404s, non-HAL responses and impossible navigation are
//!   distinct [`HalError`] variants
//!
//! A navigator is single-owner: navigation takes `&mut self`.
//!
//! # Example
//!
//! ```ignore
//! use hal_client::{HalClient, HalClientConfig, NavigateOptions};
//!
//! let config = HalClientConfig::load(Some("hal-client.yaml".as_ref()))?;
//! let mut client = HalClient::from_config(&config)?;
//!
//! client
//!     .navigate_with(
//!         "pb:latest-provider-pacts",
//!         &NavigateOptions::new().param("provider", "Animal Service"),
//!     )
//!     .await?;
//!
//! client.for_each("pb:pacts", |link| println!("{}", link.href)).await?;
//!
//! let outcome = client
//!     .upload_json("/pacts/provider/P/consumer/C/version/1.0.0", &pact_json)
//!     .await?;
//! ```

mod client;
mod config;
mod document;
mod error;
pub mod failure;
mod links;
mod navigator;
pub mod template;
mod transport;
mod write;

#[cfg(test)]
mod testing;

pub use client::HalClient;
pub use config::{Credentials, ENV_PREFIX, HalClientConfig};
pub use document::{LINKS_KEY, ResourceDocument};
pub use error::HalError;
pub use links::{Link, LinkDirectory, Links};
pub use navigator::{HalNavigator, NavigateOptions, NavigationSession, ROOT_PATH};
pub use transport::{
    HAL_ACCEPT, HAL_JSON, HalTransport, JSON_CONTENT_TYPE, TransportResponse, is_hal_media_type,
    is_json_media_type,
};
pub use write::{Outcome, STATUS_FAILED, STATUS_OK};

pub use hal_http::{HttpClient, HttpError, SecretString};
