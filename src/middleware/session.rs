//! Sign-out on 401.

use std::sync::Arc;

use tracing::info;

use crate::catalog::LOGIN_PATH;
use crate::error::ClassifiedError;
use crate::middleware::Inbound;
use crate::response::Body;
use crate::session::{SessionStore, TOKEN_KEY};

/// A full top-level navigation that bypasses the navigation guard.
///
/// Implemented by [`Navigator`](crate::Navigator) and by any
/// `Fn(&str) + Send + Sync`, which is handy for embedding and tests.
pub trait HardRedirect: Send + Sync {
    fn assign(&self, path: &str);
}

impl<F> HardRedirect for F
where
    F: Fn(&str) + Send + Sync,
{
    fn assign(&self, path: &str) {
        self(path)
    }
}

/// On `Unauthorized`: removes the token from the session and hard-redirects
/// to the login path. The error still reaches the caller.
///
/// Only the token is removed. The role flag is left for the next sign-in to
/// overwrite; without a token it grants nothing.
pub struct SessionReset {
    session: Arc<dyn SessionStore>,
    redirect: Arc<dyn HardRedirect>,
    login_path: String,
}

impl SessionReset {
    pub fn new(session: Arc<dyn SessionStore>, redirect: Arc<dyn HardRedirect>) -> Self {
        Self { session, redirect, login_path: LOGIN_PATH.to_owned() }
    }

    /// Overrides the hard-redirect target. Defaults to `/login`.
    pub fn login_path(mut self, path: &str) -> Self {
        self.login_path = path.to_owned();
        self
    }
}

impl Inbound for SessionReset {
    fn on_response(&self, result: Result<Body, ClassifiedError>) -> Result<Body, ClassifiedError> {
        if let Err(ClassifiedError::Unauthorized(_)) = result {
            self.session.remove(TOKEN_KEY);
            info!(to = %self.login_path, "credential rejected, redirecting to login");
            self.redirect.assign(&self.login_path);
        }
        result
    }
}
