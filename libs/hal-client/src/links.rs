use crate::template;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A single HAL link object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Untemplated link to `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
            name: None,
            title: None,
        }
    }

    /// Returns the href to request: expanded with `params` when the link is
    /// templated, verbatim otherwise.
    #[must_use]
    pub fn resolve(&self, params: &BTreeMap<String, String>) -> String {
        if self.templated {
            template::expand(&self.href, params)
        } else {
            self.href.clone()
        }
    }
}

/// The value of one relation: a single link or an ordered list of links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Links {
    One(Link),
    Many(Vec<Link>),
}

impl Links {
    /// First entry whose `name` equals `name`.
    ///
    /// A single link matches only when it carries that name.
    #[must_use]
    pub fn find_named(&self, name: &str) -> Option<&Link> {
        self.iter().find(|link| link.name.as_deref() == Some(name))
    }

    /// Iterates over the links in order; a single link yields one item.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        match self {
            Self::One(link) => std::slice::from_ref(link).iter(),
            Self::Many(links) => links.iter(),
        }
    }

    /// Names of the entries that have one, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().filter_map(|link| link.name.as_deref()).collect()
    }

    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The `_links` section of the current document, keyed by relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDirectory {
    relations: BTreeMap<String, Links>,
}

impl LinkDirectory {
    /// Builds the directory from a `_links` object.
    ///
    /// A relation whose value is neither a link object nor an array is
    /// skipped. In an array only the entries that are not link objects are
    /// dropped; the relation itself stays present, even if no entry survives.
    #[must_use]
    pub fn from_map(links: &Map<String, Value>) -> Self {
        let relations = links
            .iter()
            .filter_map(|(relation, value)| {
                parse_relation(relation, value).map(|parsed| (relation.clone(), parsed))
            })
            .collect();
        Self { relations }
    }

    /// `None` when the relation is absent. A relation holding an empty list
    /// is present and yields `Some(Links::Many(vec![]))`.
    #[must_use]
    pub fn lookup(&self, relation: &str) -> Option<&Links> {
        self.relations.get(relation)
    }

    /// Relation names in sorted order.
    #[must_use]
    pub fn relations(&self) -> Vec<&str> {
        self.relations.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }
}

fn parse_relation(relation: &str, value: &Value) -> Option<Links> {
    if let Value::Array(entries) = value {
        let links = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match Link::deserialize(entry) {
                Ok(link) => Some(link),
                Err(e) => {
                    tracing::debug!(relation = %relation, index, error = %e, "skipping malformed link entry");
                    None
                }
            })
            .collect();
        return Some(Links::Many(links));
    }

    match Link::deserialize(value) {
        Ok(link) => Some(Links::One(link)),
        Err(e) => {
            tracing::debug!(relation = %relation, error = %e, "skipping malformed link relation");
            None
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn directory(value: &Value) -> LinkDirectory {
        LinkDirectory::from_map(value.as_object().unwrap())
    }

    #[test]
    fn single_and_list_relations_parse() {
        let dir = directory(&json!({
            "self": {"href": "/"},
            "pb:latest-version": {
                "href": "/pacticipants/{pacticipant}/latest-version",
                "templated": true,
                "title": "Latest version"
            },
            "pb:pacts": [
                {"name": "bar", "href": "/x"},
                {"name": "baz", "href": "/y"}
            ]
        }));

        assert_eq!(dir.len(), 3);
        assert_eq!(dir.lookup("self"), Some(&Links::One(Link::new("/"))));

        let latest = match dir.lookup("pb:latest-version") {
            Some(Links::One(link)) => link,
            other => panic!("unexpected {other:?}"),
        };
        assert!(latest.templated);
        assert_eq!(latest.title.as_deref(), Some("Latest version"));

        let pacts = dir.lookup("pb:pacts").unwrap();
        assert!(pacts.is_many());
        assert_eq!(pacts.names(), vec!["bar", "baz"]);
    }

    #[test]
    fn missing_relation_differs_from_empty_list() {
        let dir = directory(&json!({"pb:pacts": []}));
        assert_eq!(dir.lookup("pb:pacts"), Some(&Links::Many(Vec::new())));
        assert_eq!(dir.lookup("pb:webhooks"), None);
    }

    #[test]
    fn malformed_relations_are_skipped() {
        let dir = directory(&json!({
            "self": {"href": "/"},
            "broken": "not a link",
            "also-broken": {"title": "no href"}
        }));
        assert_eq!(dir.relations(), vec!["self"]);
    }

    #[test]
    fn malformed_list_entry_drops_only_that_entry() {
        let dir = directory(&json!({
            "pb:pacts": [
                {"name": "bar", "href": "/x"},
                {"name": "baz"},
                "not a link",
                {"name": "qux", "href": "/z"}
            ],
            "pb:broken-list": [{"title": "no href"}]
        }));

        let pacts = dir.lookup("pb:pacts").unwrap();
        assert_eq!(pacts.names(), vec!["bar", "qux"]);
        assert_eq!(pacts.find_named("bar").unwrap().href, "/x");
        assert!(pacts.find_named("baz").is_none());

        assert_eq!(dir.lookup("pb:broken-list"), Some(&Links::Many(Vec::new())));
        assert_eq!(dir.relations(), vec!["pb:broken-list", "pb:pacts"]);
    }

    #[test]
    fn relations_are_sorted() {
        let dir = directory(&json!({
            "z": {"href": "/z"},
            "a": {"href": "/a"},
            "m": {"href": "/m"}
        }));
        assert_eq!(dir.relations(), vec!["a", "m", "z"]);
        assert!(!dir.is_empty());
        assert!(LinkDirectory::default().is_empty());
    }

    #[test]
    fn find_named_picks_first_match() {
        let links: Links = serde_json::from_value(json!([
            {"name": "bar", "href": "/x"},
            {"name": "baz", "href": "/y"},
            {"name": "bar", "href": "/z"}
        ]))
        .unwrap();
        assert_eq!(links.find_named("bar").unwrap().href, "/x");
        assert_eq!(links.find_named("baz").unwrap().href, "/y");
        assert!(links.find_named("qux").is_none());
    }

    #[test]
    fn resolve_expands_only_templated_links() {
        let params: BTreeMap<String, String> =
            [("id".to_owned(), "42".to_owned())].into_iter().collect();

        let templated = Link {
            templated: true,
            ..Link::new("/items/{id}")
        };
        assert_eq!(templated.resolve(&params), "/items/42");

        let literal = Link::new("/items/{id}");
        assert_eq!(literal.resolve(&params), "/items/{id}");
    }

    #[test]
    fn iteration_over_single_link() {
        let links = Links::One(Link::new("/only"));
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(hrefs, vec!["/only"]);
        assert!(!links.is_many());
    }
}
