//! `{name}` placeholder expansion for templated link hrefs.
//!
//! Only simple word-character placeholders are recognised; there is no
//! operator syntax and no percent-encoding of substituted values. A
//! placeholder without a value is re-emitted verbatim.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // constant pattern, cannot fail
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("static regex should not panic"));

/// Substitutes every `{name}` in `template` with `params[name]`.
///
/// Substituted values are not scanned again, so a value that itself looks
/// like a placeholder is inserted literally.
#[must_use]
pub fn expand(template: &str, params: &BTreeMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            params
                .get(&caps[1])
                .map_or_else(|| caps[0].to_owned(), Clone::clone)
        })
        .into_owned()
}

/// Placeholder names in order of appearance (duplicates included).
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
