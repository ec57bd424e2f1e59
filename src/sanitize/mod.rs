//! Query-parameter sanitizer.
//!
//! Strips tracking parameters (see [`denylist`]) and the fragment from a URL.
//! The functions here are pure: the input is never mutated and the same input
//! always produces the same output, so sanitizing twice is a no-op.
//!
//! When nothing is stripped the raw query is left byte-for-byte as it was.
//! Otherwise the surviving parameters are re-encoded in their original order,
//! and a query left empty is removed altogether.

pub mod denylist;

use std::collections::HashSet;

use url::Url;

use crate::observability::metrics;

pub use denylist::is_denied;

/// Remove tracking parameters and the fragment from `url`.
pub fn sanitize(url: &Url) -> Url {
    sanitize_with(url, &HashSet::new())
}

/// Like [`sanitize`], but parameters named in `permitted` are always kept.
pub fn sanitize_with(url: &Url, permitted: &HashSet<String>) -> Url {
    let mut out = url.clone();
    out.set_fragment(None);

    if url.query().is_none() {
        return out;
    }

    let mut kept: Vec<(String, String)> = Vec::new();
    let mut stripped = 0u64;
    for (key, value) in url.query_pairs() {
        if is_denied(&key) && !permitted.contains(&*key) {
            tracing::debug!(param = %key, value = %value, "query parameter stripped");
            stripped += 1;
        } else {
            tracing::debug!(param = %key, value = %value, "query parameter kept");
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    if stripped == 0 {
        return out;
    }

    if kept.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(&kept);
    }

    tracing::debug!(stripped, url = %out, "stripped query params from link");
    metrics::record_params_stripped(stripped);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(input: &str) -> String {
        sanitize(&Url::parse(input).unwrap()).to_string()
    }

    #[test]
    fn test_fragment_stripped() {
        assert_eq!(clean("https://x/y?a=1#frag"), "https://x/y?a=1");
        assert_eq!(clean("https://x/y#"), "https://x/y");
        assert_eq!(clean("https://x/y#a=1&utm_source=z"), "https://x/y");
    }

    #[test]
    fn test_no_query_passes_through() {
        assert_eq!(clean("https://example.com/article"), "https://example.com/article");
    }

    #[test]
    fn test_only_denied_params_leaves_empty_query() {
        let out = sanitize(&Url::parse("https://example.com/a?utm_source=tw&ref=home&WT.mc_id=1#top").unwrap());
        assert_eq!(out.query(), None);
        assert_eq!(out.fragment(), None);
        assert_eq!(out.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_preserves_other_params_unchanged() {
        let out = clean("https://example.com/watch?v=abc123&utm_medium=social&page=2");
        assert_eq!(out, "https://example.com/watch?v=abc123&page=2");
    }

    #[test]
    fn test_untouched_query_keeps_raw_encoding() {
        assert_eq!(clean("https://example.com/s?q=a%20b&x"), "https://example.com/s?q=a%20b&x");
    }

    #[test]
    fn test_name_match_is_case_insensitive_prefix_is_not() {
        let out = clean("https://example.com/?SOURCE=a&UTM_keep=b&utm_drop=c");
        assert_eq!(out, "https://example.com/?UTM_keep=b");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/a?b=1 2&utm_source=x#f",
            "https://example.com/a?tag=x&tag=y&keep=%2F",
            "https://example.com/a?keep",
            "https://example.com/a?",
        ];
        for input in inputs {
            let once = sanitize(&Url::parse(input).unwrap());
            let twice = sanitize(&once);
            assert_eq!(once, twice, "{input}");
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let input = Url::parse("https://example.com/a?ref=x#frag").unwrap();
        let _ = sanitize(&input);
        assert_eq!(input.as_str(), "https://example.com/a?ref=x#frag");
    }

    #[test]
    fn test_permitted_params_survive() {
        let permitted: HashSet<String> = ["tag".to_string()].into();
        let input = Url::parse("https://www.amazon.com/dp/B0?tag=me-20&psc=1").unwrap();
        let out = sanitize_with(&input, &permitted);
        assert_eq!(out.as_str(), "https://www.amazon.com/dp/B0?tag=me-20");
    }
}
