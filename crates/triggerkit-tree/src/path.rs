//! Slash-separated tree paths.

/// Non-empty segments of `path`.
///
/// ```
/// use triggerkit_tree::path::path_parts;
/// assert_eq!(path_parts("/users//alice/"), vec!["users", "alice"]);
/// assert!(path_parts("").is_empty());
/// ```
pub fn path_parts(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Joins two paths with exactly one separator between them.
pub fn join_path(base: &str, child: &str) -> String {
    let base = base.trim_end_matches('/');
    let child = child.trim_start_matches('/');
    match (base.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{child}"),
    }
}
