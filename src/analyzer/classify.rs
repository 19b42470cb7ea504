// src/analyzer/classify.rs
// =============================================================================
// Decides whether a link is internal or external.
//
// The rule is purely syntactic: an href that parses as an absolute URL with
// a host is External, everything else is Internal. That includes relative
// paths, fragment-only links, mailto:/tel: style links (no host) and
// strings that don't parse at all.
//
// An absolute URL pointing back at the page's own host still counts as
// External. No same-origin detection is attempted.
// =============================================================================

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    External,
}

/// Classifies an href. No network access.
pub fn classify(href: &str) -> LinkKind {
    match Url::parse(href.trim()) {
        Ok(url) if url.has_host() => LinkKind::External,
        _ => LinkKind::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_are_external() {
        assert_eq!(classify("http://ok.example"), LinkKind::External);
        assert_eq!(classify("https://www.rust-lang.org/learn"), LinkKind::External);
        assert_eq!(classify("ftp://files.example/pub"), LinkKind::External);
    }

    #[test]
    fn test_relative_and_fragment_links_are_internal() {
        assert_eq!(classify("/x"), LinkKind::Internal);
        assert_eq!(classify("../about"), LinkKind::Internal);
        assert_eq!(classify("#section"), LinkKind::Internal);
        assert_eq!(classify("?page=2"), LinkKind::Internal);
        assert_eq!(classify("//cdn.example/lib.js"), LinkKind::Internal);
    }

    #[test]
    fn test_hostless_schemes_are_internal() {
        assert_eq!(classify("mailto:test@example.com"), LinkKind::Internal);
        assert_eq!(classify("javascript:void(0)"), LinkKind::Internal);
        assert_eq!(classify("tel:+123456"), LinkKind::Internal);
    }

    #[test]
    fn test_unparsable_is_internal() {
        assert_eq!(classify("http://[::1"), LinkKind::Internal);
        assert_eq!(classify("not a url at all"), LinkKind::Internal);
    }

    #[test]
    fn test_same_host_absolute_is_still_external() {
        assert_eq!(classify("https://example.com/own-page"), LinkKind::External);
    }

    #[test]
    fn test_deterministic() {
        for href in ["/a", "http://b.example", "%%%", "#c"] {
            assert_eq!(classify(href), classify(href));
        }
    }
}
