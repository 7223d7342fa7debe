//! Wildcard extraction from resource templates.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

fn wildcard_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[^/{}]*\}").expect("invalid regex"))
}

/// Extracts `{name}` wildcard values from a concrete resource.
///
/// Both strings are split on `/`; each wildcard reads the instance segment at
/// the same position as the wildcard in the template. Wildcards whose position
/// is out of range are omitted. Never fails.
///
/// ```rust
/// use triggerkit_core::match_wildcards;
///
/// let params = match_wildcards(
///     "projects/p/databases/(default)/documents/users/{userId}",
///     "projects/p/databases/(default)/documents/users/alice",
/// );
/// assert_eq!(params["userId"], "alice");
/// ```
pub fn match_wildcards(template: &str, instance: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let template_parts: Vec<&str> = template.split('/').collect();
    let instance_parts: Vec<&str> = instance.split('/').collect();

    for wildcard in wildcard_pattern().find_iter(template) {
        let token = wildcard.as_str();
        let Some(position) = template_parts.iter().position(|part| *part == token) else {
            continue;
        };
        if let Some(value) = instance_parts.get(position) {
            let name = &token[1..token.len() - 1];
            params.insert(name.to_string(), (*value).to_string());
        }
    }

    params
}
