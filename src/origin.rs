//! Origin helpers.
//!
//! The panel identifies frames by origin strings such as
//! `https://www.bbc.com/`, while frames only expose the URL they were
//! declared with. Matching between the two is deliberately loose: the
//! scheme and a `www.` prefix are ignored and the remainder is searched
//! for inside the frame source.

use url::Url;

/// Strip a trailing slash and any leading `http://`, `https://` or `www.`.
pub fn normalize_origin(origin: &str) -> &str {
    let trimmed = origin.strip_suffix('/').unwrap_or(origin);
    let no_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    no_scheme.strip_prefix("www.").unwrap_or(no_scheme)
}

/// Whether `frame_source` belongs to `origin`.
///
/// Two empty strings match. Callers walking frame lists rely on this to
/// treat "no selection, no source" as a hit.
pub fn matches(origin: &str, frame_source: &str) -> bool {
    let normalized = normalize_origin(origin);
    if !frame_source.is_empty() && normalized.is_empty() {
        return false;
    }
    frame_source.contains(normalized)
}

/// ASCII serialization of the origin of `url`, `None` for opaque origins
/// (`about:`, `data:`) and unparsable input.
pub fn serialize_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Origin to show for a frame declared with `src`.
///
/// `about:` URLs are shown verbatim; anything unparsable falls back to the
/// raw source. Empty sources have no origin.
pub fn display_origin(src: &str) -> Option<String> {
    if src.is_empty() {
        return None;
    }
    if src.starts_with("about:") {
        return Some(src.to_string());
    }
    Some(serialize_origin(src).unwrap_or_else(|| src.to_string()))
}

/// Exact origin comparison, tolerant of a trailing slash on either side.
pub fn same_origin(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('/').unwrap_or(a);
    let b = b.strip_suffix('/').unwrap_or(b);
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_scheme_and_www() {
        assert!(matches("https://bbc.com/", "https://www.bbc.com"));
        assert!(matches("http://www.example.org", "https://example.org/embed?x=1"));
        assert!(matches("https://ads.example.com", "https://ads.example.com/tag"));
    }

    #[test]
    fn rejects_unrelated_source() {
        assert!(!matches("https://bbc.com", "https://cnn.com/player"));
    }

    #[test]
    fn empty_origin_never_matches_a_source() {
        assert!(!matches("", "https://bbc.com"));
        assert!(!matches("www.", "https://bbc.com"));
        assert!(matches("", ""));
        assert!(!matches("https://bbc.com", ""));
    }

    #[test]
    fn origin_serialization() {
        assert_eq!(
            serialize_origin("https://ads.example.com/tag?id=4").as_deref(),
            Some("https://ads.example.com")
        );
        assert_eq!(
            serialize_origin("http://localhost:8080/x").as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(serialize_origin("about:blank"), None);
        assert_eq!(display_origin("about:blank").as_deref(), Some("about:blank"));
        assert_eq!(display_origin(""), None);
    }

    #[test]
    fn same_origin_tolerates_trailing_slash() {
        assert!(same_origin("https://example.com/", "https://example.com"));
        assert!(!same_origin("https://example.com", "https://a.example.com"));
        assert!(!same_origin("", ""));
    }
}
