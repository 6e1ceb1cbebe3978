//! HAL navigation: root discovery, relation lookup and link following.
//!
//! The navigator starts from the API root (`/`), fetched lazily on first use,
//! and moves one hop at a time. Each successful hop replaces the current
//! document; a failed hop leaves the session untouched.
//!
//! ```ignore
//! let mut client = HalClient::from_config(&config)?;
//! client
//!     .navigate("pb:latest-provider-pacts")
//!     .await?
//!     .navigate_with("pb:pacts", &NavigateOptions::new().named("Consumer"))
//!     .await?;
//! let pact = client.document();
//! ```

use crate::document::ResourceDocument;
use crate::error::HalError;
use crate::links::{Link, LinkDirectory, Links};
use crate::template;
use crate::transport::{HAL_ACCEPT, HalTransport};
use http::StatusCode;
use std::collections::BTreeMap;
use url::Url;

/// Path of the API root document.
pub const ROOT_PATH: &str = "/";

/// Disambiguation and template parameters for following a relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Entry name to pick when the relation holds a list of links.
    pub name: Option<String>,
    /// Values for `{placeholder}` tokens of a templated link.
    pub params: BTreeMap<String, String>,
}

impl NavigateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// State of one navigation: the fixed base URL, the last path fetched and the
/// current document.
///
/// Owned by exactly one [`HalNavigator`]; all mutation goes through
/// `&mut HalNavigator`.
#[derive(Debug, Clone)]
pub struct NavigationSession {
    base_url: Url,
    last_url: Option<String>,
    current: Option<ResourceDocument>,
}

impl NavigationSession {
    /// # Errors
    /// Returns [`HalError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// `http` or `https` URL with a host.
    pub fn new(base_url: &str) -> Result<Self, HalError> {
        let invalid = |reason: String| HalError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };

        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_owned()));
        }

        Ok(Self {
            base_url: parsed,
            last_url: None,
            current: None,
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    #[must_use]
    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    #[must_use]
    pub fn document(&self) -> Option<&ResourceDocument> {
        self.current.as_ref()
    }

    /// Absolute URL for `path`.
    ///
    /// Absolute `http(s)` hrefs are returned verbatim; anything else is
    /// appended to the base URL path (`http://host/api` + `/pacts` gives
    /// `http://host/api/pacts`).
    #[must_use]
    pub fn resolve(&self, path: &str) -> String {
        if is_absolute_http(path) {
            return path.to_owned();
        }
        let base = self.base_url();
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn replace(&mut self, path: String, document: ResourceDocument) {
        self.last_url = Some(path);
        self.current = Some(document);
    }

    fn clear(&mut self) {
        self.last_url = None;
        self.current = None;
    }
}

fn is_absolute_http(href: &str) -> bool {
    Url::parse(href).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Client that walks a HAL API by relation name.
///
/// Not meant to be shared: every operation that moves the session takes
/// `&mut self`. Use one navigator per concurrent flow.
pub struct HalNavigator<T> {
    transport: T,
    session: NavigationSession,
}

impl<T> std::fmt::Debug for HalNavigator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalNavigator")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<T: HalTransport> HalNavigator<T> {
    /// # Errors
    /// Returns [`HalError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str, transport: T) -> Result<Self, HalError> {
        Ok(Self {
            transport,
            session: NavigationSession::new(base_url)?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// Path of the most recently fetched document.
    #[must_use]
    pub fn last_url(&self) -> Option<&str> {
        self.session.last_url()
    }

    /// The current document; `None` until the first navigation.
    #[must_use]
    pub fn document(&self) -> Option<&ResourceDocument> {
        self.session.document()
    }

    #[must_use]
    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Forgets the current document; the next navigation starts from the root.
    pub fn reset(&mut self) {
        self.session.clear();
    }

    /// Follows `relation` from the current document.
    ///
    /// # Errors
    /// See [`navigate_with`](Self::navigate_with).
    pub async fn navigate(&mut self, relation: &str) -> Result<&mut Self, HalError> {
        self.navigate_with(relation, &NavigateOptions::default())
            .await
    }

    /// Follows `relation`, picking the entry named `options.name` when the
    /// relation is a list and expanding templated hrefs with `options.params`.
    ///
    /// The root document is fetched first if nothing has been fetched yet.
    ///
    /// # Errors
    /// - [`HalError::InvalidResponse`] if the current document has no
    ///   `_links`, or a fetched response is not HAL/JSON
    /// - [`HalError::InvalidNavigation`] if the relation is absent, or is a
    ///   list and `options.name` is missing or matches no entry
    /// - [`HalError::NotFoundResponse`] on HTTP 404
    /// - [`HalError::RequestFailed`], [`HalError::Json`] or
    ///   [`HalError::Transport`] for other fetch failures
    pub async fn navigate_with(
        &mut self,
        relation: &str,
        options: &NavigateOptions,
    ) -> Result<&mut Self, HalError> {
        self.ensure_root().await?;
        let path = self.resolve_relation(relation, options)?;
        let document = self.fetch(&path).await?;
        self.session.replace(path, document);
        Ok(self)
    }

    /// Fetches the resource behind `relation` without moving the session.
    ///
    /// # Errors
    /// Same as [`navigate_with`](Self::navigate_with).
    pub async fn fetch_link(
        &mut self,
        relation: &str,
        options: &NavigateOptions,
    ) -> Result<ResourceDocument, HalError> {
        self.ensure_root().await?;
        let path = self.resolve_relation(relation, options)?;
        self.fetch(&path).await
    }

    /// Raw `href` of a single-valued relation; templates are not expanded and
    /// the target is not fetched.
    ///
    /// # Errors
    /// [`HalError::InvalidNavigation`] if the relation is absent or holds a
    /// list, plus any error from fetching the root document.
    pub async fn link_url(&mut self, relation: &str) -> Result<String, HalError> {
        match self.get_link(relation).await? {
            Links::One(link) => Ok(link.href),
            Links::Many(entries) => Err(HalError::InvalidNavigation {
                relation: relation.to_owned(),
                reason: format!(
                    "relation has {} entries, expected a single link",
                    entries.len()
                ),
            }),
        }
    }

    /// The link (or links) stored under `relation` in the current document.
    ///
    /// # Errors
    /// [`HalError::InvalidNavigation`] if the relation is absent,
    /// [`HalError::InvalidResponse`] if the document has no `_links`, plus any
    /// error from fetching the root document.
    pub async fn get_link(&mut self, relation: &str) -> Result<Links, HalError> {
        self.ensure_root().await?;
        let directory = self.current_links()?;
        directory
            .lookup(relation)
            .cloned()
            .ok_or_else(|| missing_relation(relation, directory))
    }

    /// Calls `visitor` for each link under `relation` (once for a single link).
    ///
    /// # Errors
    /// Same as [`get_link`](Self::get_link).
    pub async fn for_each<F>(&mut self, relation: &str, mut visitor: F) -> Result<(), HalError>
    where
        F: FnMut(&Link),
    {
        let links = self.get_link(relation).await?;
        for link in &links {
            visitor(link);
        }
        Ok(())
    }

    /// GETs `path` and parses it as a HAL document.
    ///
    /// Does not touch the session.
    ///
    /// # Errors
    /// - [`HalError::NotFoundResponse`] on HTTP 404
    /// - [`HalError::InvalidResponse`] if the content type is not
    ///   `application/json` or `application/hal+json`; an error status is
    ///   named in the reason
    /// - [`HalError::RequestFailed`] for other error statuses
    /// - [`HalError::Json`] if the body does not parse
    /// - [`HalError::Transport`] if no response was obtained
    pub async fn fetch(&self, path: &str) -> Result<ResourceDocument, HalError> {
        let url = self.session.resolve(path);
        tracing::debug!(url = %url, "fetching HAL resource");

        let response = self
            .transport
            .get(&url, &[(http::header::ACCEPT.as_str(), HAL_ACCEPT)])
            .await?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(HalError::NotFoundResponse {
                base_url: self.base_url().to_owned(),
                path: path.to_owned(),
            });
        }

        if !response.is_hal() {
            let content_type = response.content_type().map(str::to_owned);
            let status = if response.status.is_success() {
                String::new()
            } else {
                format!(" with status {}", response.status_reason())
            };
            return Err(HalError::InvalidResponse {
                base_url: self.base_url().to_owned(),
                path: path.to_owned(),
                reason: format!(
                    "expected application/hal+json or application/json content type, got '{}'{status}",
                    content_type.as_deref().unwrap_or("<none>")
                ),
                content_type,
            });
        }

        if !response.status.is_success() {
            tracing::debug!(url = %url, status = %response.status, "HAL resource request failed");
            return Err(HalError::RequestFailed {
                status: response.status,
                path: path.to_owned(),
                body: response.text().into_owned(),
            });
        }

        let body = serde_json::from_slice(&response.body).map_err(|source| HalError::Json {
            path: path.to_owned(),
            source,
        })?;
        Ok(ResourceDocument::new(body))
    }

    async fn ensure_root(&mut self) -> Result<(), HalError> {
        if self.session.current.is_none() {
            let root = self.fetch(ROOT_PATH).await?;
            self.session.replace(ROOT_PATH.to_owned(), root);
        }
        Ok(())
    }

    fn current_links(&self) -> Result<&LinkDirectory, HalError> {
        let path = self.last_url().unwrap_or(ROOT_PATH);
        self.session
            .current
            .as_ref()
            .and_then(ResourceDocument::links)
            .ok_or_else(|| HalError::InvalidResponse {
                base_url: self.base_url().to_owned(),
                path: path.to_owned(),
                content_type: None,
                reason: "document has no _links section".to_owned(),
            })
    }

    /// Picks the link for `relation` and returns the path to request.
    fn resolve_relation(
        &self,
        relation: &str,
        options: &NavigateOptions,
    ) -> Result<String, HalError> {
        let directory = self.current_links()?;
        let links = directory
            .lookup(relation)
            .ok_or_else(|| missing_relation(relation, directory))?;
        let link = select_link(relation, links, options.name.as_deref())?;

        if link.templated {
            let unresolved: Vec<&str> = template::placeholders(&link.href)
                .into_iter()
                .filter(|name| !options.params.contains_key(*name))
                .collect();
            if !unresolved.is_empty() {
                tracing::warn!(
                    relation = %relation,
                    href = %link.href,
                    unresolved = ?unresolved,
                    "templated link followed with missing parameters; placeholders left as-is"
                );
            }
        }

        Ok(link.resolve(&options.params))
    }
}

fn select_link<'a>(
    relation: &str,
    links: &'a Links,
    name: Option<&str>,
) -> Result<&'a Link, HalError> {
    let entries = match links {
        Links::One(link) => return Ok(link),
        Links::Many(entries) => entries,
    };

    let invalid = |reason: String| HalError::InvalidNavigation {
        relation: relation.to_owned(),
        reason,
    };
    let Some(name) = name else {
        return Err(invalid(format!(
            "relation has multiple entries, must filter by name (available names: {})",
            links.names().join(", ")
        )));
    };

    entries
        .iter()
        .find(|link| link.name.as_deref() == Some(name))
        .ok_or_else(|| {
            invalid(format!(
                "no entry with name '{name}' (available names: {})",
                links.names().join(", ")
            ))
        })
}

fn missing_relation(relation: &str, directory: &LinkDirectory) -> HalError {
    HalError::InvalidNavigation {
        relation: relation.to_owned(),
        reason: format!(
            "no such relation; available relations: {}",
            directory.relations().join(", ")
        ),
    }
}
