//! Immutable, ordered route table
//!
//! Wraps [`square_router::Router`] with route metadata and enforces the
//! table invariants at construction: unique names, and exactly one
//! catch-all declared last. With those in place [`RouteTable::resolve`]
//! cannot fail.

use std::collections::HashSet;

use square_router::{PatternError, Router};

use crate::location::{self, Location, Query};
use crate::route::{app_routes, Guard, Route};
use crate::{Error, Result};

/// A location matched against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Route name
    pub name: String,
    /// View registry key
    pub view: String,
    /// Matched path without query or hash
    pub path: String,
    pub params: Vec<(String, String)>,
    pub query: Query,
    pub hash: Option<String>,
    /// Path plus query and hash, as it should appear in the URL bar
    pub full_path: String,
    pub guard: Option<Guard>,
}

impl ResolvedRoute {
    /// Look up a captured path parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered route table, first match wins
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    matcher: Router,
}

impl RouteTable {
    /// Build and validate a table
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        let mut matcher = Router::new();
        let mut names = HashSet::new();
        let mut catch_all: Option<&str> = None;

        for route in &routes {
            if let Some(previous) = catch_all {
                return Err(Error::CatchAllNotLast(previous.to_string()));
            }
            if !names.insert(route.name.as_str()) {
                return Err(Error::DuplicateName(route.name.clone()));
            }

            let index = matcher.insert(&route.path)?;
            let is_catch_all = matcher
                .pattern(index)
                .is_some_and(|pattern| pattern.is_catch_all());
            if is_catch_all {
                catch_all = Some(&route.name);
            }
        }

        if catch_all.is_none() {
            return Err(Error::MissingCatchAll);
        }

        Ok(Self { routes, matcher })
    }

    /// The square application's table
    pub fn app() -> Result<Self> {
        Self::new(app_routes())
    }

    /// Routes in declaration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route by name
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Resolve a URL (path, optional query and hash) to a route
    ///
    /// Unmatched paths resolve to the catch-all route.
    pub fn resolve(&self, url: &str) -> ResolvedRoute {
        let split = location::split_url(url);
        let path = if split.path.is_empty() { "/" } else { split.path };

        // The catch-all accepts every path, so a match always exists.
        let (index, params) = match self.matcher.find(path) {
            Some(m) => (m.index, m.params),
            None => (self.routes.len() - 1, Vec::new()),
        };
        let params = params
            .into_iter()
            .map(|(name, value)| (name, location::decode_segment(&value)))
            .collect();
        let route = &self.routes[index];

        let query = location::parse_query(split.query);
        let mut full_path = path.to_string();
        if let Some(q) = split.query.filter(|q| !q.is_empty()) {
            full_path.push('?');
            full_path.push_str(q);
        }
        if let Some(h) = split.hash.filter(|h| !h.is_empty()) {
            full_path.push('#');
            full_path.push_str(h);
        }

        tracing::debug!(url, route = %route.name, "matched route");

        ResolvedRoute {
            name: route.name.clone(),
            view: route.view.clone(),
            path: path.to_string(),
            params,
            query,
            hash: split.hash.filter(|h| !h.is_empty()).map(str::to_string),
            full_path,
            guard: route.guard.clone(),
        }
    }

    /// Build the URL for a location without resolving it
    pub fn url_for(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => Ok(path.clone()),
            Location::Named {
                name,
                params,
                query,
            } => {
                let index = self
                    .routes
                    .iter()
                    .position(|r| &r.name == name)
                    .ok_or_else(|| Error::UnknownRoute(name.clone()))?;
                let pattern = self
                    .matcher
                    .pattern(index)
                    .ok_or_else(|| Error::UnknownRoute(name.clone()))?;

                let params: Vec<(String, String)> = params
                    .iter()
                    .map(|(param, value)| {
                        let encoded = if pattern.catch_all() == Some(param.as_str()) {
                            value
                                .split('/')
                                .map(location::encode_segment)
                                .collect::<Vec<_>>()
                                .join("/")
                        } else {
                            location::encode_segment(value)
                        };
                        (param.clone(), encoded)
                    })
                    .collect();

                let mut url = pattern.fill(&params).map_err(|e| match e {
                    PatternError::MissingParam { name: param, .. } => Error::MissingParam {
                        route: name.clone(),
                        param,
                    },
                    other => Error::InvalidPattern(other),
                })?;
                if let Some(q) = location::encode_query(query) {
                    url.push('?');
                    url.push_str(&q);
                }
                Ok(url)
            }
        }
    }

    /// Resolve any location
    pub fn resolve_location(&self, location: &Location) -> Result<ResolvedRoute> {
        Ok(self.resolve(&self.url_for(location)?))
    }
}
