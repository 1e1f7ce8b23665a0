//! The authentication collaborator seam.
//!
//! The hosted auth provider is external; this layer only needs "current
//! user id, or none" plus a way to hear about sign-in/sign-out
//! transitions. [`SessionAuth`] is the in-process implementation used by
//! the server (one per verified session) and by tests.

use tokio::sync::watch;

use musafir_core::UserId;

/// Source of the current user identity and auth-state transitions.
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Subscribe to auth-state changes. The receiver yields the new
    /// identity on every sign-in, sign-out, or user-id change.
    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}

/// Watch-channel backed auth state for one session.
#[derive(Debug)]
pub struct SessionAuth {
    tx: watch::Sender<Option<UserId>>,
}

impl SessionAuth {
    /// Start signed out.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(None),
        }
    }

    /// Start with a signed-in user.
    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self {
            tx: watch::Sender::new(Some(user)),
        }
    }

    /// Record a sign-in (or a switch to a different user).
    pub fn sign_in(&self, user: UserId) {
        self.tx.send_replace(Some(user));
    }

    /// Record a sign-out.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for SessionAuth {
    fn current_user(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_signed_out() {
        let auth = SessionAuth::new();
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let auth = SessionAuth::new();
        auth.sign_in(UserId::new("u1"));
        assert_eq!(auth.current_user(), Some(UserId::new("u1")));
        auth.sign_out();
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let auth = SessionAuth::new();
        let mut rx = auth.subscribe();

        auth.sign_in(UserId::new("u1"));
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow_and_update(), Some(UserId::new("u1")));

        auth.sign_out();
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow_and_update(), None);
    }
}
