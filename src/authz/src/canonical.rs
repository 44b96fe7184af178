//! Request identifier canonicalization
//!
//! Index keys are matched against the canonical form verbatim: the last path
//! segment, plus the first query parameter if there is one. Two entry points
//! exist because callers hold the request in two shapes, and each keeps its
//! own truncation rules.

use tracing::{debug, trace};

/// Canonicalize a request path and its separate query string
///
/// Everything up to and including the last `/` of `raw_path` is dropped. A
/// blank or absent query yields the segment alone; otherwise the query is cut
/// at its first `&` and appended after a `?`.
///
/// # Example
///
/// ```rust
/// use menuguard_authz::canonical::canonicalize_request_path;
///
/// assert_eq!(
///     canonicalize_request_path("/PB/menuitem.do", Some("item-id=6876&menu=y")),
///     "menuitem.do?item-id=6876"
/// );
/// assert_eq!(canonicalize_request_path("/PB/menuitem.do", Some("")), "menuitem.do");
/// ```
pub fn canonicalize_request_path(raw_path: &str, raw_query: Option<&str>) -> String {
    trace!("canonicalize_request_path: path[{}] query[{:?}]", raw_path, raw_query);

    let segment = last_segment(raw_path);
    let query = match raw_query {
        Some(query) if !query.trim().is_empty() => query,
        _ => {
            debug!("No query string, canonical path is [{}]", segment);
            return segment.to_string();
        }
    };

    let first_param = match query.find('&') {
        Some(amp) => &query[..amp],
        None => query,
    };

    let canonical = format!("{}?{}", segment, first_param);
    debug!("Canonical path [{}]", canonical);
    canonical
}

/// Canonicalize a combined path-and-query string
///
/// Keeps the text after the last `/` (or the whole string when there is none)
/// up to the first `&`. An `&` at position zero does not truncate. When the
/// first `&` sits before the last `/`, the rule is applied to the final
/// segment alone.
///
/// # Example
///
/// ```rust
/// use menuguard_authz::canonical::canonicalize_uri;
///
/// assert_eq!(
///     canonicalize_uri("http://host/menuItem.do?item-id=6876&menu=yes"),
///     "menuItem.do?item-id=6876"
/// );
/// assert_eq!(canonicalize_uri("cashFlowPlan.do?action=x&className=y&id=15"), "cashFlowPlan.do?action=x");
/// ```
pub fn canonicalize_uri(complete: &str) -> String {
    trace!("canonicalize_uri: complete[{}]", complete);

    let start = complete.rfind('/').map_or(0, |slash| slash + 1);
    let canonical = match complete.find('&') {
        Some(amp) if amp > 0 && amp >= start => &complete[start..amp],
        // the tail holds no '/', so this recurses at most once
        Some(amp) if amp < start => return canonicalize_uri(&complete[start..]),
        _ => &complete[start..],
    };

    debug!("Canonical uri [{}]", canonical);
    canonical.to_string()
}

fn last_segment(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[slash + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_keeps_first_parameter() {
        assert_eq!(
            canonicalize_request_path("/PB/menuitem.do", Some("item-id=6876")),
            "menuitem.do?item-id=6876"
        );
        assert_eq!(
            canonicalize_request_path("/PB/menuitem.do", Some("item-id=6876&menu=yes&x=1")),
            "menuitem.do?item-id=6876"
        );
    }

    #[test]
    fn test_request_path_without_query() {
        assert_eq!(canonicalize_request_path("/PB/menuitem.do", Some("")), "menuitem.do");
        assert_eq!(canonicalize_request_path("/PB/menuitem.do", Some("   ")), "menuitem.do");
        assert_eq!(canonicalize_request_path("/PB/menuitem.do", None), "menuitem.do");
        assert_eq!(canonicalize_request_path("menuitem.do", None), "menuitem.do");
        assert_eq!(canonicalize_request_path("/PB/", None), "");
    }

    #[test]
    fn test_request_path_leading_ampersand() {
        assert_eq!(canonicalize_request_path("/a/b.do", Some("&x=1")), "b.do?");
    }

    #[test]
    fn test_uri_examples() {
        assert_eq!(canonicalize_uri("menuItem.do?item-id=6876"), "menuItem.do?item-id=6876");
        assert_eq!(
            canonicalize_uri("/menuItem.do?item-id=6876&menu=yes"),
            "menuItem.do?item-id=6876"
        );
        assert_eq!(
            canonicalize_uri("http://host/menuItem.do?item-id=6876&menu=yes"),
            "menuItem.do?item-id=6876"
        );
        assert_eq!(
            canonicalize_uri("cashFlowPlan.do?action=x&className=y&id=15"),
            "cashFlowPlan.do?action=x"
        );
    }

    #[test]
    fn test_uri_ampersand_edges() {
        // '&' at position zero never truncates
        assert_eq!(canonicalize_uri("&a&b"), "&a&b");
        // '&' right after the last '/' leaves nothing
        assert_eq!(canonicalize_uri("/&a"), "");
        // '&' before the last '/' applies the rule to the final segment
        assert_eq!(canonicalize_uri("x.do?a=1&b=/y.do?c=2&d=3"), "y.do?c=2");
        assert_eq!(canonicalize_uri(""), "");
    }

    #[test]
    fn test_uri_is_idempotent_on_its_output() {
        for input in [
            "/menuItem.do?item-id=6876&menu=yes",
            "&a&b",
            "/&a",
            "x.do?a=1&b=/&y",
            "plain",
        ] {
            let once = canonicalize_uri(input);
            assert_eq!(canonicalize_uri(&once), once, "input {:?}", input);
        }
    }
}
