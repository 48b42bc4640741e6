//! Authentication state seam
//!
//! The router only ever reads authentication state. Hosts implement
//! [`AuthState`] over whatever store owns the session.

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use thiserror::Error;

/// Authentication state could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Authentication state unavailable: {0}")]
pub struct AuthError(pub String);

/// Read-only authentication query
#[async_trait(?Send)]
pub trait AuthState {
    /// Whether the current user is signed in
    async fn is_authenticated(&self) -> Result<bool, AuthError>;
}

/// Shared in-memory authentication flag
///
/// Clones observe the same flag, so a store can keep one handle and give
/// another to the navigator.
#[derive(Debug, Clone, Default)]
pub struct AuthFlag(Rc<Cell<bool>>);

impl AuthFlag {
    pub fn new(authenticated: bool) -> Self {
        Self(Rc::new(Cell::new(authenticated)))
    }

    pub fn set(&self, authenticated: bool) {
        self.0.set(authenticated);
    }

    pub fn get(&self) -> bool {
        self.0.get()
    }
}

#[async_trait(?Send)]
impl AuthState for AuthFlag {
    async fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_flag_shared_between_clones() {
        let store = AuthFlag::new(false);
        let handle = store.clone();

        assert_eq!(block_on(handle.is_authenticated()), Ok(false));
        store.set(true);
        assert_eq!(block_on(handle.is_authenticated()), Ok(true));
    }
}
