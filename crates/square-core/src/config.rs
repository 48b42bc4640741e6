//! Navigator configuration

use std::time::Duration;

use crate::scroll::ScrollBehavior;

/// Navigator configuration
#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    /// URL prefix the application is served under (empty = root)
    pub base: String,
    /// Guard redirects allowed per navigation before giving up
    pub max_redirects: usize,
    /// Upper bound on one authentication check
    ///
    /// Only enforced when the navigator has a real timer
    /// (`Navigator::timer`); the default `NeverTimer` never fires.
    pub guard_timeout: Duration,
    /// Scroll handling after navigation
    pub scroll: ScrollBehavior,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            base: String::new(),
            max_redirects: 8,
            guard_timeout: Duration::from_secs(10),
            scroll: ScrollBehavior::Restore,
        }
    }
}

impl NavigatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    pub fn guard_timeout(mut self, timeout: Duration) -> Self {
        self.guard_timeout = timeout;
        self
    }

    pub fn scroll(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll = behavior;
        self
    }
}
