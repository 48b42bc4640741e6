//! WASM bindings for JavaScript interop

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use js_sys::{Array, Function, Object, Promise, Reflect};
use square_core::{
    Navigation, NavigationFailure, NavigationResult, Navigator, NavigatorConfig, ResolvedRoute,
    RouteTable, ViewRegistry,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::PopStateEvent;

use crate::browser::{BrowserHistory, BrowserViewport, GlooTimer, JsAuth};
use crate::logging;

// ============================================================================
// Logging
// ============================================================================

/// Send router logs to the browser console ("trace" … "error", default "info")
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    logging::init_logging(logging::parse_level(level.as_deref()));
}

// ============================================================================
// Route table
// ============================================================================

/// Route match result for WASM
#[wasm_bindgen]
pub struct RouteMatch {
    pub guarded: bool,
    name: String,
    full_path: String,
    params: Vec<String>,
}

#[wasm_bindgen]
impl RouteMatch {
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    #[wasm_bindgen(getter = fullPath)]
    pub fn full_path(&self) -> String {
        self.full_path.clone()
    }

    /// Params flattened as `[name, value, name, value, ...]`
    #[wasm_bindgen(getter)]
    pub fn params(&self) -> Vec<String> {
        self.params.clone()
    }
}

impl From<&ResolvedRoute> for RouteMatch {
    fn from(route: &ResolvedRoute) -> Self {
        Self {
            guarded: route.guard.is_some(),
            name: route.name.clone(),
            full_path: route.full_path.clone(),
            params: route
                .params
                .iter()
                .flat_map(|(k, v)| [k.clone(), v.clone()])
                .collect(),
        }
    }
}

/// WASM-exposed route table
#[wasm_bindgen]
pub struct WasmRouteTable {
    inner: RouteTable,
}

#[wasm_bindgen]
impl WasmRouteTable {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmRouteTable, JsError> {
        Ok(Self {
            inner: RouteTable::app()?,
        })
    }

    /// Resolve a path; unmatched paths resolve to `notfound`
    pub fn resolve(&self, path: &str) -> RouteMatch {
        RouteMatch::from(&self.inner.resolve(path))
    }

    /// Route names in matching order
    pub fn names(&self) -> Vec<String> {
        self.inner.routes().iter().map(|r| r.name.clone()).collect()
    }
}

// ============================================================================
// Navigator
// ============================================================================

fn load_view(loader: &Function) -> impl std::future::Future<Output = Result<JsValue, String>> {
    let called = loader.call0(&JsValue::NULL);
    async move {
        let value = called.map_err(|e| format!("{e:?}"))?;
        match value.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(|e| format!("{e:?}")),
            Err(value) => Ok(value),
        }
    }
}

fn views_from_object(loaders: &Object) -> Result<ViewRegistry<JsValue>, JsError> {
    let mut views = ViewRegistry::new();
    for entry in Object::entries(loaders).iter() {
        let pair: Array = entry.unchecked_into();
        let name = pair
            .get(0)
            .as_string()
            .ok_or_else(|| JsError::new("view names must be strings"))?;
        let loader: Function = pair
            .get(1)
            .dyn_into()
            .map_err(|_| JsError::new(&format!("view '{name}' must be a function")))?;
        views.register_async(name, move || load_view(&loader));
    }
    Ok(views)
}

fn to_js(navigation: &Navigation<JsValue>) -> JsValue {
    let result = Object::new();
    let set = |key: &str, value: &JsValue| {
        let _ = Reflect::set(&result, &JsValue::from_str(key), value);
    };
    set("name", &JsValue::from_str(&navigation.route.name));
    set("fullPath", &JsValue::from_str(&navigation.route.full_path));
    set("view", &navigation.view);
    if let Some(from) = navigation.redirected_from() {
        set("redirectedFrom", &JsValue::from_str(from));
    }
    result.into()
}

type Callback = Rc<RefCell<Option<Function>>>;

fn settle(result: NavigationResult<JsValue>, on_change: &Callback) -> Result<JsValue, JsValue> {
    match result {
        Ok(navigation) => {
            let value = to_js(&navigation);
            // Cloned so the callback may replace itself
            let callback = on_change.borrow().clone();
            if let Some(callback) = callback {
                if let Err(error) = callback.call1(&JsValue::NULL, &value) {
                    tracing::error!(?error, "route change callback threw");
                }
            }
            Ok(value)
        }
        Err(NavigationFailure::Cancelled) => Ok(JsValue::NULL),
        Err(failure) => Err(JsValue::from_str(&failure.to_string())),
    }
}

/// WASM-exposed navigator over the browser's History API
#[wasm_bindgen]
pub struct WasmNavigator {
    inner: Rc<Navigator<JsValue>>,
    on_change: Callback,
    history: BrowserHistory,
    popstate: RefCell<Option<EventListener>>,
}

#[wasm_bindgen]
impl WasmNavigator {
    /// `views` maps view names to loaders (`() => import("./views/Home")`);
    /// `is_authenticated` returns a boolean or a Promise of one.
    #[wasm_bindgen(constructor)]
    pub fn new(
        views: &Object,
        is_authenticated: Function,
        base: Option<String>,
    ) -> Result<WasmNavigator, JsError> {
        let history = BrowserHistory::new().ok_or_else(|| JsError::new("no browser window"))?;
        let viewport = BrowserViewport::new(history.window().clone());
        let popstate_history = history.clone();
        let config = NavigatorConfig::new().base(base.unwrap_or_default());

        let navigator = Navigator::new(
            RouteTable::app()?,
            views_from_object(views)?,
            JsAuth::new(is_authenticated),
            history,
        )
        .viewport(viewport)
        .timer(GlooTimer)
        .config(config);

        Ok(Self {
            inner: Rc::new(navigator),
            on_change: Rc::new(RefCell::new(None)),
            history: popstate_history,
            popstate: RefCell::new(None),
        })
    }

    /// Called with `{ name, fullPath, view, redirectedFrom? }` after every
    /// successful navigation, including back/forward
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    /// Activate the current URL and start following back/forward
    pub fn start(&self) -> Promise {
        let listening = self.popstate.borrow().is_some();
        if !listening {
            let nav = Rc::clone(&self.inner);
            let on_change = Rc::clone(&self.on_change);
            let history = self.history.clone();
            let listener = EventListener::new(self.history.window(), "popstate", move |event| {
                let Some(event) = event.dyn_ref::<PopStateEvent>() else { return };
                let entry = history.entry_from_state(&event.state());
                let nav = Rc::clone(&nav);
                let on_change = Rc::clone(&on_change);
                wasm_bindgen_futures::spawn_local(async move {
                    let result = nav.handle_pop(entry).await;
                    if let Err(error) = settle(result, &on_change) {
                        tracing::warn!(?error, "back/forward navigation failed");
                    }
                });
            });
            *self.popstate.borrow_mut() = Some(listener);
        }

        let nav = Rc::clone(&self.inner);
        let on_change = Rc::clone(&self.on_change);
        future_to_promise(async move {
            let result = nav.start().await;
            settle(result, &on_change)
        })
    }

    /// Navigate to a path, adding a history entry
    ///
    /// Resolves to the activated route, or `null` if a newer navigation
    /// superseded this one.
    pub fn push(&self, path: String) -> Promise {
        let nav = Rc::clone(&self.inner);
        let on_change = Rc::clone(&self.on_change);
        future_to_promise(async move {
            let result = nav.push(path).await;
            settle(result, &on_change)
        })
    }

    /// Navigate to a path, replacing the current history entry
    pub fn replace(&self, path: String) -> Promise {
        let nav = Rc::clone(&self.inner);
        let on_change = Rc::clone(&self.on_change);
        future_to_promise(async move {
            let result = nav.replace(path).await;
            settle(result, &on_change)
        })
    }

    /// Go back one entry; the result arrives through `onChange`
    pub fn back(&self) {
        self.go(-1);
    }

    /// Go forward one entry; the result arrives through `onChange`
    pub fn forward(&self) {
        self.go(1);
    }

    pub fn go(&self, delta: i32) {
        let nav = Rc::clone(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            // Browser traversal completes through `popstate`
            let _ = nav.go(delta as isize).await;
        });
    }

    /// URL for a path, including the configured base
    pub fn href(&self, path: &str) -> Result<String, JsError> {
        Ok(self.inner.href(path)?)
    }

    /// Name of the active route, if any
    #[wasm_bindgen(getter, js_name = currentName)]
    pub fn current_name(&self) -> Option<String> {
        self.inner.current().map(|route| route.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_match_flattens_params() {
        let table = RouteTable::app().unwrap();
        let m = RouteMatch::from(&table.resolve("/skills/42?tab=info"));

        assert_eq!(m.name(), "skill");
        assert_eq!(m.full_path(), "/skills/42?tab=info");
        assert_eq!(m.params(), vec!["id".to_string(), "42".to_string()]);
        assert!(m.guarded);
    }

    #[test]
    fn test_route_match_for_unknown_path() {
        let table = RouteTable::app().unwrap();
        let m = RouteMatch::from(&table.resolve("/missing/page"));

        assert_eq!(m.name(), "notfound");
        assert!(!m.guarded);
    }
}
