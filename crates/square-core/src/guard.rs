//! Guard evaluation
//!
//! Guards fail closed: if the authentication check errors or does not
//! finish within the timeout, the user is treated as signed out.

use std::time::Duration;

use futures::future::{self, Either};

use crate::auth::AuthState;
use crate::route::Guard;
use crate::timer::Timer;

/// Ask the auth store, bounded by `timeout`
pub(crate) async fn authenticated(
    auth: &dyn AuthState,
    timer: &dyn Timer,
    timeout: Duration,
) -> bool {
    match future::select(auth.is_authenticated(), timer.sleep(timeout)).await {
        Either::Left((Ok(authenticated), _)) => authenticated,
        Either::Left((Err(error), _)) => {
            tracing::warn!(%error, "auth check failed, treating user as signed out");
            false
        }
        Either::Right(_) => {
            tracing::warn!(?timeout, "auth check timed out, treating user as signed out");
            false
        }
    }
}

/// Run a guard, returning the redirect target if it rejects the user
pub(crate) async fn evaluate(
    guard: &Guard,
    auth: &dyn AuthState,
    timer: &dyn Timer,
    timeout: Duration,
) -> Option<String> {
    let authenticated = authenticated(auth, timer, timeout).await;
    guard.check(authenticated).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, AuthFlag};
    use crate::timer::NeverTimer;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use futures::future::LocalBoxFuture;

    struct Unavailable;

    #[async_trait(?Send)]
    impl AuthState for Unavailable {
        async fn is_authenticated(&self) -> Result<bool, AuthError> {
            Err(AuthError("store not initialized".to_string()))
        }
    }

    struct Hanging;

    #[async_trait(?Send)]
    impl AuthState for Hanging {
        async fn is_authenticated(&self) -> Result<bool, AuthError> {
            future::pending().await
        }
    }

    struct Immediate;

    impl Timer for Immediate {
        fn sleep(&self, _duration: Duration) -> LocalBoxFuture<'static, ()> {
            Box::pin(future::ready(()))
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_protected_guard() {
        let guard = Guard::require_auth("/signin");

        let signed_out = AuthFlag::new(false);
        assert_eq!(
            block_on(evaluate(&guard, &signed_out, &NeverTimer, TIMEOUT)).as_deref(),
            Some("/signin")
        );

        let signed_in = AuthFlag::new(true);
        assert_eq!(block_on(evaluate(&guard, &signed_in, &NeverTimer, TIMEOUT)), None);
    }

    #[test]
    fn test_error_fails_closed() {
        assert!(!block_on(authenticated(&Unavailable, &NeverTimer, TIMEOUT)));

        // Sign-in page stays reachable when the store is down
        let signin = Guard::reject_auth("/");
        assert_eq!(block_on(evaluate(&signin, &Unavailable, &NeverTimer, TIMEOUT)), None);
    }

    #[test]
    fn test_timeout_fails_closed() {
        assert!(!block_on(authenticated(&Hanging, &Immediate, TIMEOUT)));
    }

    #[test]
    fn test_answer_beats_timer() {
        // Both ready on first poll; the auth answer wins
        assert!(block_on(authenticated(&AuthFlag::new(true), &Immediate, TIMEOUT)));
    }
}
