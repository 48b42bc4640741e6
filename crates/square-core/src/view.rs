//! Lazily loaded views
//!
//! Each view is registered as a zero-argument factory. The factory runs the
//! first time a route needing it activates; the result is cached for the
//! rest of the session.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::{Error, Result};

type Loader<V> = Box<dyn Fn() -> LocalBoxFuture<'static, std::result::Result<V, String>>>;

/// Name → lazily resolved view
pub struct ViewRegistry<V> {
    loaders: HashMap<String, Loader<V>>,
    cache: RefCell<HashMap<String, Rc<V>>>,
}

impl<V: 'static> ViewRegistry<V> {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Register a synchronous factory
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> V + 'static,
    {
        self.loaders.insert(
            name.into(),
            Box::new(move || futures::future::ready(Ok(factory())).boxed_local()),
        );
        self
    }

    /// Register an asynchronous factory, e.g. one fetching a code chunk
    pub fn register_async<F, Fut, E>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = std::result::Result<V, E>> + 'static,
        E: Display,
    {
        self.loaders.insert(
            name.into(),
            Box::new(move || factory().map(|r| r.map_err(|e| e.to_string())).boxed_local()),
        );
        self
    }

    /// True when a factory exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// True once the view has been loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }

    /// Load a view, running its factory only on first use
    pub async fn load(&self, name: &str) -> Result<Rc<V>> {
        if let Some(view) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(view));
        }

        let loader = self
            .loaders
            .get(name)
            .ok_or_else(|| Error::UnknownView(name.to_string()))?;

        tracing::debug!(view = name, "loading view");
        let view = loader().await.map_err(|reason| Error::ViewLoad {
            name: name.to_string(),
            reason,
        })?;

        // A concurrent load may have finished first; keep the earlier view.
        let mut cache = self.cache.borrow_mut();
        let view = cache
            .entry(name.to_string())
            .or_insert_with(|| Rc::new(view));
        Ok(Rc::clone(view))
    }
}

impl<V: 'static> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}
