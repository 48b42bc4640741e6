//! square-core: Client-side navigation for the square web app
//!
//! Resolves URLs against an ordered route table, runs authentication
//! guards, loads views lazily and restores scroll positions. Hosts plug in
//! through small traits ([`AuthState`], [`History`], [`Viewport`],
//! [`Timer`]) so the same navigator runs in the browser and in tests.
//!
//! ## Features
//! - `native` - Tokio-backed [`Timer`] for guard timeouts
//!
//! ## Example
//! ```
//! use futures::executor::block_on;
//! use square_core::{AuthFlag, MemoryHistory, Navigator, RouteTable, ViewRegistry};
//!
//! let mut views = ViewRegistry::new();
//! for route in square_core::app_routes() {
//!     let name = route.name.clone();
//!     views.register(route.view, move || name.clone());
//! }
//!
//! let auth = AuthFlag::new(false);
//! let table = RouteTable::app().unwrap();
//! let nav = Navigator::new(table, views, auth.clone(), MemoryHistory::new("/"));
//! block_on(nav.start()).unwrap();
//!
//! let nav_result = block_on(nav.push("/skills/42")).unwrap();
//! assert_eq!(nav_result.route.name, "signin");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod error;
mod guard;
pub mod history;
pub mod location;
pub mod navigator;
pub mod route;
pub mod scroll;
pub mod table;
pub mod timer;
pub mod view;

// Re-exports
pub use auth::{AuthError, AuthFlag, AuthState};
pub use config::NavigatorConfig;
pub use error::{Error, NavigationFailure, Result};
pub use history::{EntryKey, History, HistoryEntry, MemoryHistory};
pub use location::{Location, Query};
pub use navigator::{Navigation, NavigationResult, Navigator};
pub use route::{app_routes, Access, Guard, Route};
pub use scroll::{MemoryViewport, ScrollBehavior, ScrollPosition, Viewport};
pub use table::{ResolvedRoute, RouteTable};
pub use timer::{NeverTimer, Timer};
pub use view::ViewRegistry;

#[cfg(feature = "native")]
pub use timer::TokioTimer;
