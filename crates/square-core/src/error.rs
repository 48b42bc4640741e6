//! Error types for square-core

use square_router::PatternError;
use thiserror::Error;

/// Result type alias for square operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building the route table or resolving locations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed path pattern
    #[error("Invalid route pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// Two routes share a name
    #[error("Duplicate route name: {0}")]
    DuplicateName(String),

    /// A catch-all route is followed by other routes
    #[error("Catch-all route '{0}' must be declared last")]
    CatchAllNotLast(String),

    /// Table has no catch-all route to fall back on
    #[error("Route table has no catch-all route")]
    MissingCatchAll,

    /// Named location refers to an unknown route
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Named location is missing a parameter its pattern needs
    #[error("Route '{route}' needs parameter '{param}'")]
    MissingParam { route: String, param: String },

    /// Route has no registered view
    #[error("No view registered for route: {0}")]
    UnknownView(String),

    /// View factory failed
    #[error("Failed to load view '{name}': {reason}")]
    ViewLoad { name: String, reason: String },
}

/// Why a navigation did not activate its destination
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationFailure {
    /// A newer navigation started before this one finished
    #[error("Navigation cancelled by a newer navigation")]
    Cancelled,

    /// Destination is already the current location
    #[error("Already at {0}")]
    Duplicated(String),

    /// Guards kept redirecting
    #[error("Redirect loop detected after {hops} hops")]
    RedirectLoop { hops: usize },

    /// Destination could not be resolved or its view failed to load
    #[error(transparent)]
    Route(#[from] Error),
}
