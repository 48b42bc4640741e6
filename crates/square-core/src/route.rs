//! Route declarations

/// Which authentication state a guarded route admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Only signed-in users may enter
    Authenticated,
    /// Only signed-out users may enter (sign-in and similar pages)
    Anonymous,
}

/// Access rule evaluated before a route activates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub access: Access,
    /// Where to send users the rule rejects
    pub redirect: String,
}

impl Guard {
    /// Admit signed-in users, redirect everyone else
    pub fn require_auth(redirect: impl Into<String>) -> Self {
        Self {
            access: Access::Authenticated,
            redirect: redirect.into(),
        }
    }

    /// Admit signed-out users, redirect everyone else
    pub fn reject_auth(redirect: impl Into<String>) -> Self {
        Self {
            access: Access::Anonymous,
            redirect: redirect.into(),
        }
    }

    /// Redirect target for the given auth state, `None` to proceed
    pub fn check(&self, authenticated: bool) -> Option<&str> {
        let admitted = match self.access {
            Access::Authenticated => authenticated,
            Access::Anonymous => !authenticated,
        };
        (!admitted).then_some(self.redirect.as_str())
    }
}

/// A path pattern bound to a named view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: String,
    /// Key into the view registry
    pub view: String,
    pub guard: Option<Guard>,
}

impl Route {
    /// Route whose view key equals its name
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: path.into(),
            view: name.clone(),
            name,
            guard: None,
        }
    }

    /// Use a different view key
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    /// Attach a guard
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// The square application's routes, in matching order
pub fn app_routes() -> Vec<Route> {
    vec![
        Route::new("/", "home"),
        Route::new("/qa", "qa"),
        Route::new("/signup", "signup"),
        Route::new("/signin", "signin").guard(Guard::reject_auth("/")),
        Route::new("/skills", "skills").guard(Guard::require_auth("/signin")),
        Route::new("/skills/:id", "skill").guard(Guard::require_auth("/signin")),
        Route::new("/explain", "explain"),
        Route::new("/feedback", "feedback"),
        Route::new("*", "notfound"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_guard_check() {
        let protected = Guard::require_auth("/signin");
        assert_eq!(protected.check(false), Some("/signin"));
        assert_eq!(protected.check(true), None);

        let signin = Guard::reject_auth("/");
        assert_eq!(signin.check(false), None);
        assert_eq!(signin.check(true), Some("/"));
    }

    #[test]
    fn test_app_route_names_unique() {
        let routes = app_routes();
        let names: HashSet<_> = routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), routes.len());
    }

    #[test]
    fn test_app_redirect_targets_unguarded_against_source() {
        // Following a redirect never bounces straight back
        let routes = app_routes();
        for route in &routes {
            let Some(guard) = &route.guard else { continue };
            let target = routes.iter().find(|r| r.path == guard.redirect).unwrap();
            if let Some(target_guard) = &target.guard {
                assert_ne!(target_guard.access, guard.access);
                assert_ne!(target_guard.redirect, route.path);
            }
        }
    }
}
