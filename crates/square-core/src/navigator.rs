//! Navigation state machine
//!
//! Every navigation walks Matching → Guarding → (Redirecting → Matching)*
//! → Activating. Navigations may overlap while a guard or view load is
//! pending; each takes a generation ticket and gives up with
//! [`NavigationFailure::Cancelled`] as soon as a newer one has started, so
//! only the latest request ever commits.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::auth::AuthState;
use crate::config::NavigatorConfig;
use crate::error::NavigationFailure;
use crate::guard;
use crate::history::{EntryKey, History, HistoryEntry};
use crate::location::{self, Location};
use crate::scroll::{MemoryViewport, ScrollPosition, Viewport};
use crate::table::{ResolvedRoute, RouteTable};
use crate::timer::{NeverTimer, Timer};
use crate::view::ViewRegistry;
use crate::Result;

/// Outcome of a navigation attempt
pub type NavigationResult<V> = std::result::Result<Navigation<V>, NavigationFailure>;

/// A completed navigation
#[derive(Debug)]
pub struct Navigation<V> {
    /// Route that was activated
    pub route: ResolvedRoute,
    /// Its loaded view
    pub view: Rc<V>,
    /// Full paths guards redirected away from, in order
    pub redirects: SmallVec<[String; 2]>,
    /// Where the viewport was scrolled, `None` if left alone
    pub scroll: Option<ScrollPosition>,
}

impl<V> Navigation<V> {
    /// Path originally requested, when a guard redirected
    pub fn redirected_from(&self) -> Option<&str> {
        self.redirects.first().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Push,
    Replace,
    /// Host already moved to this entry (back/forward or initial load)
    Traverse(HistoryEntry),
}

/// Client-side navigator
pub struct Navigator<V> {
    table: RouteTable,
    views: ViewRegistry<V>,
    auth: Box<dyn AuthState>,
    history: Box<dyn History>,
    viewport: Box<dyn Viewport>,
    timer: Box<dyn Timer>,
    config: NavigatorConfig,
    current: RefCell<Option<ResolvedRoute>>,
    current_key: Cell<Option<EntryKey>>,
    generation: Cell<u64>,
}

impl<V: 'static> Navigator<V> {
    /// Navigator with an in-memory viewport, no guard timeout and default config
    ///
    /// `NeverTimer` is installed, so `guard_timeout` only takes effect after
    /// [`Navigator::timer`] supplies a real timer (`TokioTimer` natively,
    /// `GlooTimer` in the browser).
    pub fn new(
        table: RouteTable,
        views: ViewRegistry<V>,
        auth: impl AuthState + 'static,
        history: impl History + 'static,
    ) -> Self {
        Self {
            table,
            views,
            auth: Box::new(auth),
            history: Box::new(history),
            viewport: Box::new(MemoryViewport::new()),
            timer: Box::new(NeverTimer),
            config: NavigatorConfig::default(),
            current: RefCell::new(None),
            current_key: Cell::new(None),
            generation: Cell::new(0),
        }
    }

    pub fn viewport(mut self, viewport: impl Viewport + 'static) -> Self {
        self.viewport = Box::new(viewport);
        self
    }

    pub fn timer(mut self, timer: impl Timer + 'static) -> Self {
        self.timer = Box::new(timer);
        self
    }

    pub fn config(mut self, mut config: NavigatorConfig) -> Self {
        config.base = location::normalize_base(&config.base);
        self.config = config;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn views(&self) -> &ViewRegistry<V> {
        &self.views
    }

    /// Route currently active, `None` before the first navigation
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current.borrow().clone()
    }

    /// URL a link to `location` should carry, including the base
    pub fn href(&self, location: impl Into<Location>) -> Result<String> {
        let url = self.table.url_for(&location.into())?;
        Ok(self.with_base(&url))
    }

    /// Activate whatever the host's current history entry points at
    pub async fn start(&self) -> NavigationResult<V> {
        let entry = self.history.current();
        self.handle_pop(entry).await
    }

    /// Navigate, appending a history entry
    pub async fn push(&self, location: impl Into<Location>) -> NavigationResult<V> {
        let url = self.table.url_for(&location.into())?;
        self.run(&url, Mode::Push).await
    }

    /// Navigate, overwriting the current history entry
    pub async fn replace(&self, location: impl Into<Location>) -> NavigationResult<V> {
        let url = self.table.url_for(&location.into())?;
        self.run(&url, Mode::Replace).await
    }

    /// Traverse history; `None` when the host moved nowhere or will report
    /// the move later through [`Navigator::handle_pop`]
    pub async fn go(&self, delta: isize) -> Option<NavigationResult<V>> {
        let entry = self.history.go(delta)?;
        Some(self.handle_pop(entry).await)
    }

    pub async fn back(&self) -> Option<NavigationResult<V>> {
        self.go(-1).await
    }

    pub async fn forward(&self) -> Option<NavigationResult<V>> {
        self.go(1).await
    }

    /// Host reports that history moved to `entry` (e.g. a `popstate` event)
    pub async fn handle_pop(&self, entry: HistoryEntry) -> NavigationResult<V> {
        let url = location::strip_base(&self.config.base, &entry.url).to_string();
        self.run(&url, Mode::Traverse(entry)).await
    }

    fn with_base(&self, url: &str) -> String {
        format!("{}{}", self.config.base, url)
    }

    fn is_stale(&self, ticket: u64) -> bool {
        self.generation.get() != ticket
    }

    async fn run(&self, url: &str, mode: Mode) -> NavigationResult<V> {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);

        let mut target = self.table.resolve(url);
        let mut redirects: SmallVec<[String; 2]> = SmallVec::new();

        while let Some(guard) = target.guard.clone() {
            let redirect = guard::evaluate(
                &guard,
                self.auth.as_ref(),
                self.timer.as_ref(),
                self.config.guard_timeout,
            )
            .await;
            if self.is_stale(ticket) {
                tracing::debug!(url, "navigation superseded while guarding");
                return Err(NavigationFailure::Cancelled);
            }

            let Some(redirect) = redirect else { break };
            if redirects.len() >= self.config.max_redirects {
                tracing::warn!(url, hops = redirects.len() + 1, "too many guard redirects");
                return Err(NavigationFailure::RedirectLoop {
                    hops: redirects.len() + 1,
                });
            }
            tracing::info!(from = %target.full_path, to = %redirect, "guard redirected navigation");
            redirects.push(std::mem::replace(&mut target, self.table.resolve(&redirect)).full_path);
        }

        if !matches!(mode, Mode::Traverse(_)) {
            let duplicated = self
                .current
                .borrow()
                .as_ref()
                .is_some_and(|current| current.full_path == target.full_path);
            if duplicated {
                return Err(NavigationFailure::Duplicated(target.full_path));
            }
        }

        let view = self.views.load(&target.view).await?;
        if self.is_stale(ticket) {
            tracing::debug!(url, "navigation superseded while loading view");
            return Err(NavigationFailure::Cancelled);
        }

        Ok(self.commit(target, view, redirects, mode))
    }

    fn commit(
        &self,
        route: ResolvedRoute,
        view: Rc<V>,
        redirects: SmallVec<[String; 2]>,
        mode: Mode,
    ) -> Navigation<V> {
        if let Some(key) = self.current_key.get() {
            self.history.save_scroll(key, self.viewport.offset());
        }

        let url = self.with_base(&route.full_path);
        let (entry, saved) = match mode {
            Mode::Push => (self.history.push(&url), None),
            Mode::Replace => (self.history.replace(&url), None),
            Mode::Traverse(entry) => {
                let saved = self.history.saved_scroll(entry.key);
                let entry = if entry.url == url {
                    entry
                } else {
                    self.history.replace(&url)
                };
                (entry, saved)
            }
        };
        self.current_key.set(Some(entry.key));

        let scroll = self.config.scroll.target(saved);
        if let Some(position) = scroll {
            self.viewport.scroll_to(position);
        }

        tracing::info!(route = %route.name, path = %route.full_path, "navigated");
        *self.current.borrow_mut() = Some(route.clone());

        Navigation {
            route,
            view,
            redirects,
            scroll,
        }
    }
}
