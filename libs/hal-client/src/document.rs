use crate::links::LinkDirectory;
use serde_json::Value;

/// Key under which HAL documents carry their links.
pub const LINKS_KEY: &str = "_links";

/// A parsed HAL (or plain JSON) response body.
///
/// A document without `_links` is still a valid leaf resource; it just cannot
/// be navigated from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDocument {
    body: Value,
    links: Option<LinkDirectory>,
}

impl ResourceDocument {
    #[must_use]
    pub fn new(body: Value) -> Self {
        let links = body
            .get(LINKS_KEY)
            .and_then(Value::as_object)
            .map(LinkDirectory::from_map);
        Self { body, links }
    }

    /// `None` when `_links` is absent or is not an object.
    #[must_use]
    pub fn links(&self) -> Option<&LinkDirectory> {
        self.links.as_ref()
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Top-level attribute of the payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }
}

impl From<Value> for ResourceDocument {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}
