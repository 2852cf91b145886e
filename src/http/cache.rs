//! HTTP cache validation
//!
//! `ETag` generation and `If-None-Match` handling for static files.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted `ETag` for the given content, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Whether the client's `If-None-Match` value covers `etag`
///
/// Accepts a single tag, a comma separated list, or `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client| {
        client
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_stable_and_quoted() {
        let a = generate_etag(b"<h1>portfolio</h1>");
        assert_eq!(a, generate_etag(b"<h1>portfolio</h1>"));
        assert_ne!(a, generate_etag(b"<h1>changed</h1>"));
        assert!(a.starts_with('"') && a.ends_with('"'));
    }

    #[test]
    fn test_if_none_match() {
        let etag = generate_etag(b"css");
        assert!(check_etag_match(Some(&etag), &etag));
        assert!(check_etag_match(Some(&format!("\"other\", {etag}")), &etag));
        assert!(check_etag_match(Some("*"), &etag));
        assert!(!check_etag_match(Some("\"other\""), &etag));
        assert!(!check_etag_match(None, &etag));
    }
}
