//! Navigation targets and URL splitting

use url::form_urlencoded;

/// Query pairs in declaration order
pub type Query = Vec<(String, String)>;

/// Where a navigation should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Concrete URL, e.g. `/skills/42?tab=info#top`
    Path(String),
    /// Route name plus the params and query needed to build its URL
    Named {
        name: String,
        params: Vec<(String, String)>,
        query: Query,
    },
}

impl Location {
    /// Target a route by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            params: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Add a path parameter to a named location; no-op for paths
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        if let Self::Named { params, .. } = &mut self {
            params.push((key.into(), value.to_string()));
        }
        self
    }

    /// Add a query pair to a named location; no-op for paths
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        if let Self::Named { query, .. } = &mut self {
            query.push((key.into(), value.to_string()));
        }
        self
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

/// A URL split into its routable parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitUrl<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub hash: Option<&'a str>,
}

/// Split `path?query#hash`; a hash may contain `?`
pub(crate) fn split_url(url: &str) -> SplitUrl<'_> {
    let (rest, hash) = match url.split_once('#') {
        Some((rest, hash)) => (rest, Some(hash)),
        None => (url, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    SplitUrl { path, query, hash }
}

pub(crate) fn parse_query(query: Option<&str>) -> Query {
    query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

pub(crate) fn encode_query(query: &[(String, String)]) -> Option<String> {
    if query.is_empty() {
        return None;
    }
    Some(
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish(),
    )
}

/// Percent-encode one path segment; `/`, `?` and `#` never survive raw
pub(crate) fn encode_segment(value: &str) -> String {
    // byte_serialize writes spaces as `+` and escapes a literal `+`
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Percent-decode a captured path value; `+` stays literal
pub(crate) fn decode_segment(value: &str) -> String {
    let escaped = value
        .replace('+', "%2B")
        .replace('&', "%26")
        .replace('=', "%3D");
    form_urlencoded::parse(escaped.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

/// Normalize a base such as `app/` into `/app`; empty stays empty
pub(crate) fn normalize_base(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Remove `base` from the front of a URL path
///
/// Paths outside the base are returned unchanged so they still resolve
/// (usually to the catch-all).
pub(crate) fn strip_base<'a>(base: &str, url: &'a str) -> &'a str {
    if base.is_empty() {
        return url;
    }
    match url.strip_prefix(base) {
        Some("") => "/",
        Some(rest) if rest.starts_with(['/', '?', '#']) => rest,
        _ => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url() {
        let split = split_url("/skills/42?tab=info&x=1#top");
        assert_eq!(split.path, "/skills/42");
        assert_eq!(split.query, Some("tab=info&x=1"));
        assert_eq!(split.hash, Some("top"));

        let split = split_url("/qa#a?b");
        assert_eq!(split.path, "/qa");
        assert_eq!(split.query, None);
        assert_eq!(split.hash, Some("a?b"));
    }

    #[test]
    fn test_query_round_trip() {
        let query = parse_query(Some("q=hello+world&lang=en"));
        assert_eq!(
            query,
            vec![
                ("q".to_string(), "hello world".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
        assert_eq!(encode_query(&query).as_deref(), Some("q=hello+world&lang=en"));
        assert_eq!(encode_query(&[]), None);
    }

    #[test]
    fn test_base() {
        assert_eq!(normalize_base("app/"), "/app");
        assert_eq!(normalize_base("/"), "");

        assert_eq!(strip_base("/app", "/app/skills"), "/skills");
        assert_eq!(strip_base("/app", "/app"), "/");
        assert_eq!(strip_base("/app", "/app?x=1"), "?x=1");
        assert_eq!(strip_base("/app", "/apple"), "/apple");
        assert_eq!(strip_base("", "/qa"), "/qa");
    }

    #[test]
    fn test_named_builder() {
        let location = Location::named("skill").param("id", 42).query("tab", "info");
        assert_eq!(
            location,
            Location::Named {
                name: "skill".to_string(),
                params: vec![("id".to_string(), "42".to_string())],
                query: vec![("tab".to_string(), "info".to_string())],
            }
        );

        assert_eq!(Location::from("/qa").param("id", 1), Location::Path("/qa".to_string()));
    }
}
