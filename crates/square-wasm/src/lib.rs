//! square-wasm: Browser bindings for the square client router
//!
//! Connects `square-core`'s navigator to the History API, the window's
//! scroll offset, `setTimeout` and a JavaScript authentication predicate,
//! and exposes it to JavaScript through `wasm-bindgen`.

pub mod browser;
pub mod logging;

#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::*;

pub use browser::{BrowserHistory, BrowserViewport, GlooTimer, JsAuth};
pub use logging::init_logging as init_console_logging;
