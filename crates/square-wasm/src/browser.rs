//! Browser implementations of the navigator's host traits
//!
//! `BrowserHistory` drives the History API in "history mode" (clean URLs,
//! no `#` marker). Each entry is stamped with a numeric key in
//! `history.state`; scroll offsets are kept per key for the session.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Object, Promise, Reflect};
use square_core::{
    AuthError, AuthState, EntryKey, History, HistoryEntry, ScrollPosition, Timer, Viewport,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ScrollRestoration, Window};

const STATE_KEY: &str = "squareKey";

/// Join the routable parts of `window.location`
pub fn entry_url(pathname: &str, search: &str, hash: &str) -> String {
    let path = if pathname.is_empty() { "/" } else { pathname };
    format!("{path}{search}{hash}")
}

/// Read an entry key from a history state value
pub fn key_from_state(state: &JsValue) -> Option<EntryKey> {
    if !state.is_object() {
        return None;
    }
    let key = Reflect::get(state, &JsValue::from_str(STATE_KEY)).ok()?.as_f64()?;
    (key.is_finite() && key >= 0.0).then_some(key as EntryKey)
}

fn state_for(key: EntryKey) -> JsValue {
    let state = Object::new();
    // Setting a property on a fresh plain object cannot fail
    let _ = Reflect::set(&state, &JsValue::from_str(STATE_KEY), &JsValue::from_f64(key as f64));
    state.into()
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// History API backed session history
///
/// Clones share key allocation and saved scroll offsets.
#[derive(Clone)]
pub struct BrowserHistory {
    window: Window,
    next_key: Rc<Cell<EntryKey>>,
    scroll: Rc<RefCell<HashMap<EntryKey, ScrollPosition>>>,
}

impl BrowserHistory {
    /// Attach to the page's history, stamping the current entry with a key
    ///
    /// Returns `None` outside a browsing context.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        // Keys start at the page load time so entries left over from a
        // previous load in the same tab never collide with new ones.
        let history = Self {
            window,
            next_key: Rc::new(Cell::new(js_sys::Date::now() as EntryKey)),
            scroll: Rc::new(RefCell::new(HashMap::new())),
        };
        // The navigator owns scroll restoration; the browser must not
        // replay offsets on popstate or after a reload.
        let manual = history
            .window
            .history()
            .and_then(|h| h.set_scroll_restoration(ScrollRestoration::Manual));
        if let Err(error) = manual {
            let error = js_error(&error);
            tracing::warn!(%error, "could not disable browser scroll restoration");
        }
        history.ensure_key();
        Some(history)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Entry described by a `popstate` event's state
    pub fn entry_from_state(&self, state: &JsValue) -> HistoryEntry {
        // Entries created outside the router (e.g. anchor jumps) get stamped
        let key = key_from_state(state).unwrap_or_else(|| self.ensure_key());
        HistoryEntry {
            key,
            url: self.location_url(),
        }
    }

    /// Key of the displayed entry, stamping one if it has none
    fn ensure_key(&self) -> EntryKey {
        self.state_key().unwrap_or_else(|| {
            let key = self.allocate();
            self.write(&self.location_url(), key, true);
            key
        })
    }

    fn allocate(&self) -> EntryKey {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        key
    }

    fn state_key(&self) -> Option<EntryKey> {
        let state = self.window.history().ok()?.state().ok()?;
        key_from_state(&state)
    }

    fn location_url(&self) -> String {
        let location = self.window.location();
        entry_url(
            &location.pathname().unwrap_or_default(),
            &location.search().unwrap_or_default(),
            &location.hash().unwrap_or_default(),
        )
    }

    fn write(&self, url: &str, key: EntryKey, replace: bool) {
        let result = self.window.history().and_then(|history| {
            let state = state_for(key);
            if replace {
                history.replace_state_with_url(&state, "", Some(url))
            } else {
                history.push_state_with_url(&state, "", Some(url))
            }
        });
        if let Err(error) = result {
            tracing::error!(url, error = %js_error(&error), "history update failed");
        }
    }
}

impl History for BrowserHistory {
    fn current(&self) -> HistoryEntry {
        let key = self.ensure_key();
        HistoryEntry {
            key,
            url: self.location_url(),
        }
    }

    fn push(&self, url: &str) -> HistoryEntry {
        let key = self.allocate();
        self.write(url, key, false);
        HistoryEntry {
            key,
            url: url.to_string(),
        }
    }

    fn replace(&self, url: &str) -> HistoryEntry {
        let key = self.state_key().unwrap_or_else(|| self.allocate());
        self.write(url, key, true);
        HistoryEntry {
            key,
            url: url.to_string(),
        }
    }

    fn go(&self, delta: isize) -> Option<HistoryEntry> {
        // The move completes asynchronously and arrives as `popstate`.
        let delta = i32::try_from(delta).ok()?;
        if let Err(error) = self.window.history().and_then(|h| h.go_with_delta(delta)) {
            tracing::error!(delta, error = %js_error(&error), "history traversal failed");
        }
        None
    }

    fn save_scroll(&self, key: EntryKey, position: ScrollPosition) {
        self.scroll.borrow_mut().insert(key, position);
    }

    fn saved_scroll(&self, key: EntryKey) -> Option<ScrollPosition> {
        self.scroll.borrow().get(&key).copied()
    }
}

/// The window's scroll offset
pub struct BrowserViewport {
    window: Window,
}

impl BrowserViewport {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Viewport for BrowserViewport {
    fn offset(&self) -> ScrollPosition {
        ScrollPosition::new(
            self.window.scroll_x().unwrap_or_default(),
            self.window.scroll_y().unwrap_or_default(),
        )
    }

    fn scroll_to(&self, position: ScrollPosition) {
        self.window.scroll_to_with_x_and_y(position.x, position.y);
    }
}

/// `setTimeout` based timer
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        Box::pin(TimeoutFuture::new(millis))
    }
}

/// Authentication predicate supplied by JavaScript
///
/// The function may return a boolean or a Promise resolving to one.
pub struct JsAuth {
    predicate: Function,
}

impl JsAuth {
    pub fn new(predicate: Function) -> Self {
        Self { predicate }
    }
}

#[async_trait(?Send)]
impl AuthState for JsAuth {
    async fn is_authenticated(&self) -> Result<bool, AuthError> {
        let mut value = self
            .predicate
            .call0(&JsValue::NULL)
            .map_err(|e| AuthError(js_error(&e)))?;

        if let Some(promise) = value.dyn_ref::<Promise>().cloned() {
            value = JsFuture::from(promise)
                .await
                .map_err(|e| AuthError(js_error(&e)))?;
        }

        value
            .as_bool()
            .ok_or_else(|| AuthError("predicate did not return a boolean".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_url() {
        assert_eq!(entry_url("/skills/4", "?tab=1", "#top"), "/skills/4?tab=1#top");
        assert_eq!(entry_url("", "", ""), "/");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_state_key_round_trip() {
        assert_eq!(key_from_state(&state_for(42)), Some(42));
        assert_eq!(key_from_state(&JsValue::NULL), None);
    }

    #[wasm_bindgen_test]
    fn test_push_stamps_new_key() {
        let history = BrowserHistory::new().unwrap();
        let before = history.current();
        let pushed = history.push("/qa");

        assert_ne!(before.key, pushed.key);
        assert_eq!(history.current().key, pushed.key);
        assert_eq!(history.current().url, "/qa");
    }

    #[wasm_bindgen_test]
    fn test_new_takes_over_scroll_restoration() {
        let _history = BrowserHistory::new().unwrap();
        let restoration = web_sys::window()
            .unwrap()
            .history()
            .unwrap()
            .scroll_restoration()
            .unwrap();
        assert_eq!(restoration, ScrollRestoration::Manual);
    }

    #[wasm_bindgen_test]
    async fn test_js_auth_accepts_promise() {
        let predicate = Function::new_no_args("return Promise.resolve(true)");
        assert_eq!(JsAuth::new(predicate).is_authenticated().await, Ok(true));

        let predicate = Function::new_no_args("return 'yes'");
        assert!(JsAuth::new(predicate).is_authenticated().await.is_err());
    }
}
