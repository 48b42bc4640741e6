//! square-router: Zero-dependency ordered path matcher
//!
//! Matches client-side URL paths against an ordered list of patterns.
//! Unlike a trie, patterns are tried in declaration order and the first
//! one that matches wins, so a catch-all declared last only sees paths
//! no other pattern accepted.
//!
//! ## Path Syntax
//! - `/skills` - Static segments
//! - `:name` - Named parameter (captures one segment)
//! - `*` or `*name` - Catch-all (captures the remaining path, may be empty)
//!
//! Empty segments are ignored on both sides, so `/skills/` and `/skills`
//! are the same path.
//!
//! ## Example
//! ```
//! use square_router::Router;
//!
//! let mut router = Router::new();
//! router.insert("/skills").unwrap();
//! router.insert("/skills/:id").unwrap();
//! router.insert("*").unwrap();
//!
//! let m = router.find("/skills/42").unwrap();
//! assert_eq!(m.index, 1);
//! assert_eq!(m.params, vec![("id".to_string(), "42".to_string())]);
//!
//! assert_eq!(router.find("/nowhere").unwrap().index, 2);
//! ```

use std::collections::HashMap;
use std::fmt;

/// Name used for an unnamed catch-all (`*`)
pub const CATCH_ALL: &str = "*";

/// Pattern match result
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Declaration index of the matched pattern
    pub index: usize,
    /// Captured path parameters as (name, value) pairs
    pub params: Vec<(String, String)>,
}

impl Match {
    /// Get params as HashMap for convenient access
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params.iter().cloned().collect()
    }
}

/// Errors raised while parsing or filling a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Pattern is neither absolute nor a bare catch-all
    NotAbsolute(String),
    /// `:` with nothing after it
    EmptyParam(String),
    /// Same parameter name used twice in one pattern
    DuplicateParam { pattern: String, name: String },
    /// Catch-all followed by more segments
    CatchAllNotLast(String),
    /// Reverse fill without a value for a parameter
    MissingParam { pattern: String, name: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAbsolute(p) => write!(f, "pattern must start with '/': {p}"),
            Self::EmptyParam(p) => write!(f, "empty parameter name in pattern: {p}"),
            Self::DuplicateParam { pattern, name } => {
                write!(f, "parameter '{name}' appears twice in pattern: {pattern}")
            }
            Self::CatchAllNotLast(p) => {
                write!(f, "catch-all must be the last segment: {p}")
            }
            Self::MissingParam { pattern, name } => {
                write!(f, "missing parameter '{name}' for pattern: {pattern}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl Pattern {
    /// Parse a pattern such as `/skills/:id` or `*`
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') && !raw.starts_with('*') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in split(raw) {
            if matches!(segments.last(), Some(Segment::CatchAll(_))) {
                return Err(PatternError::CatchAllNotLast(raw.to_string()));
            }

            let parsed = if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyParam(raw.to_string()));
                }
                Segment::Param(name.to_string())
            } else if let Some(name) = segment.strip_prefix('*') {
                let name = if name.is_empty() { CATCH_ALL } else { name };
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Static(segment.to_string())
            };

            if let Some(name) = param_name(&parsed) {
                if segments.iter().any(|s| param_name(s) == Some(name)) {
                    return Err(PatternError::DuplicateParam {
                        pattern: raw.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(parsed);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the pattern accepts every path (`*` on its own)
    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.as_slice(), [Segment::CatchAll(_)])
    }

    /// Name of the trailing catch-all parameter, if any
    pub fn catch_all(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::CatchAll(name)) => Some(name),
            _ => None,
        }
    }

    /// Names of the parameters this pattern captures, in order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(param_name)
    }

    /// Match a path, returning captured params on success
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = split(path).collect();
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).map(|r| r.join("/")).unwrap_or_default();
                    params.push((name.clone(), rest));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if parts.get(i) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i)?;
                    params.push((name.clone(), (*value).to_string()));
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path by substituting params into the pattern
    ///
    /// Values are inserted as given, so callers escape them first. A
    /// `:param` needs a non-empty value; a catch-all without a supplied
    /// value expands to nothing.
    pub fn fill(&self, params: &[(String, String)]) -> Result<String, PatternError> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let mut path = String::new();
        for segment in &self.segments {
            let value = match segment {
                Segment::Static(s) => s.as_str(),
                Segment::Param(name) => lookup(name)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| PatternError::MissingParam {
                        pattern: self.raw.clone(),
                        name: name.clone(),
                    })?,
                Segment::CatchAll(name) => lookup(name).unwrap_or("").trim_matches('/'),
            };
            if !value.is_empty() {
                path.push('/');
                path.push_str(value);
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn param_name(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Param(name) | Segment::CatchAll(name) => Some(name),
        Segment::Static(_) => None,
    }
}

/// Ordered, first-match-wins path router
#[derive(Debug, Default, Clone)]
pub struct Router {
    patterns: Vec<Pattern>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern, returning its declaration index
    ///
    /// # Example
    /// ```
    /// use square_router::Router;
    ///
    /// let mut router = Router::new();
    /// assert_eq!(router.insert("/").unwrap(), 0);
    /// assert_eq!(router.insert("/qa").unwrap(), 1);
    /// assert!(router.insert("/files/*/more").is_err());
    /// ```
    pub fn insert(&mut self, pattern: &str) -> Result<usize, PatternError> {
        self.patterns.push(Pattern::parse(pattern)?);
        Ok(self.patterns.len() - 1)
    }

    /// Find the first pattern, in declaration order, accepting `path`
    ///
    /// `path` must already have any query or fragment removed.
    pub fn find(&self, path: &str) -> Option<Match> {
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(index, pattern)| {
                pattern.matches(path).map(|params| Match { index, params })
            })
    }

    /// Pattern at a declaration index
    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Number of registered patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern is registered
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(patterns: &[&str]) -> Router {
        let mut router = Router::new();
        for p in patterns {
            router.insert(p).unwrap();
        }
        router
    }

    #[test]
    fn test_static_routes() {
        let router = build(&["/", "/qa", "/signup"]);

        assert_eq!(router.find("/").unwrap().index, 0);
        assert_eq!(router.find("/qa").unwrap().index, 1);
        assert_eq!(router.find("/signup").unwrap().index, 2);
        assert!(router.find("/unknown").is_none());
        assert!(router.find("/qa/extra").is_none());
    }

    #[test]
    fn test_param_routes() {
        let router = build(&["/skills", "/skills/:id"]);

        let m = router.find("/skills/42").unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.params, vec![("id".to_string(), "42".to_string())]);

        let m = router.find("/skills").unwrap();
        assert_eq!(m.index, 0);
        assert!(m.params.is_empty());

        assert!(router.find("/skills/42/edit").is_none());
    }

    #[test]
    fn test_declaration_order_wins() {
        // Param declared first shadows a later static segment
        let router = build(&["/skills/:id", "/skills/new"]);
        assert_eq!(router.find("/skills/new").unwrap().index, 0);

        let router = build(&["/skills/new", "/skills/:id"]);
        assert_eq!(router.find("/skills/new").unwrap().index, 0);
        assert_eq!(router.find("/skills/7").unwrap().index, 1);
    }

    #[test]
    fn test_bare_catch_all() {
        let router = build(&["/", "*"]);

        assert_eq!(router.find("/").unwrap().index, 0);

        let m = router.find("/a/b/c").unwrap();
        assert_eq!(m.index, 1);
        assert_eq!(m.params, vec![("*".to_string(), "a/b/c".to_string())]);
    }

    #[test]
    fn test_named_catch_all() {
        let router = build(&["/files/*path"]);

        let m = router.find("/files/docs/readme.md").unwrap();
        assert_eq!(
            m.params,
            vec![("path".to_string(), "docs/readme.md".to_string())]
        );

        // Catch-all accepts an empty remainder
        let m = router.find("/files").unwrap();
        assert_eq!(m.params, vec![("path".to_string(), String::new())]);
    }

    #[test]
    fn test_trailing_slash() {
        let router = build(&["/skills"]);

        assert_eq!(router.find("/skills").unwrap().index, 0);
        assert_eq!(router.find("/skills/").unwrap().index, 0);
        assert_eq!(router.find("//skills").unwrap().index, 0);
    }

    #[test]
    fn test_is_catch_all() {
        assert!(Pattern::parse("*").unwrap().is_catch_all());
        assert!(Pattern::parse("/*rest").unwrap().is_catch_all());
        assert!(!Pattern::parse("/files/*").unwrap().is_catch_all());
        assert!(!Pattern::parse("/").unwrap().is_catch_all());
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            Pattern::parse("skills"),
            Err(PatternError::NotAbsolute("skills".to_string()))
        );
        assert_eq!(
            Pattern::parse("/skills/:"),
            Err(PatternError::EmptyParam("/skills/:".to_string()))
        );
        assert_eq!(
            Pattern::parse("/*/tail"),
            Err(PatternError::CatchAllNotLast("/*/tail".to_string()))
        );
        assert!(matches!(
            Pattern::parse("/a/:id/b/:id"),
            Err(PatternError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_fill() {
        let skill = Pattern::parse("/skills/:id").unwrap();
        let params = vec![("id".to_string(), "42".to_string())];
        assert_eq!(skill.fill(&params).unwrap(), "/skills/42");

        assert_eq!(
            skill.fill(&[]),
            Err(PatternError::MissingParam {
                pattern: "/skills/:id".to_string(),
                name: "id".to_string(),
            })
        );

        assert_eq!(Pattern::parse("/").unwrap().fill(&[]).unwrap(), "/");
        assert_eq!(Pattern::parse("*").unwrap().fill(&[]).unwrap(), "/");

        let catch_all = vec![("*".to_string(), "a/b".to_string())];
        assert_eq!(Pattern::parse("*").unwrap().fill(&catch_all).unwrap(), "/a/b");
    }

    #[test]
    fn test_fill_rejects_empty_param() {
        let skill = Pattern::parse("/skills/:id").unwrap();
        let params = vec![("id".to_string(), String::new())];
        assert!(matches!(
            skill.fill(&params),
            Err(PatternError::MissingParam { .. })
        ));
    }

    #[test]
    fn test_catch_all_name() {
        assert_eq!(Pattern::parse("*").unwrap().catch_all(), Some("*"));
        assert_eq!(Pattern::parse("/files/*path").unwrap().catch_all(), Some("path"));
        assert_eq!(Pattern::parse("/skills/:id").unwrap().catch_all(), None);
    }

    #[test]
    fn test_param_names() {
        let p = Pattern::parse("/orgs/:org/files/*path").unwrap();
        assert_eq!(p.param_names().collect::<Vec<_>>(), vec!["org", "path"]);
    }

    #[test]
    fn test_params_map() {
        let router = build(&["/skills/:id"]);

        let m = router.find("/skills/42").unwrap();
        let map = m.params_map();
        assert_eq!(map.get("id"), Some(&"42".to_string()));
    }
}
