//! Pre-navigation access guard.
//!
//! The guard answers one question per navigation attempt: may the user land
//! on this route? It never navigates itself; the [`Navigator`](crate::Navigator)
//! acts on the decision.
//!
//! | requires_auth | token | requires_admin | role | Decision |
//! |---|---|---|---|---|
//! | false | any | any | any | Proceed |
//! | true | absent | any | any | Redirect to login |
//! | true | present | true | not admin | Redirect to home |
//! | true | present | true | admin | Proceed |
//! | true | present | false | any | Proceed |
//!
//! Anything the table does not match proceeds. That fail-open default suits
//! public pages, but any new access flag must add its own row here: it will
//! not be enforced by accident.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{HOME_ROUTE, LOGIN_ROUTE, ResolvedRoute};
use crate::route::EffectiveMeta;
use crate::session::{Session, SessionStore};

/// Outcome of one guard evaluation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NavigationDecision {
    Proceed,
    RedirectTo(String),
}

/// The guard's decision rule. Pure: same inputs, same output, no I/O.
pub fn decide(meta: &EffectiveMeta, session: &Session) -> NavigationDecision {
    decide_with(meta, session, LOGIN_ROUTE, HOME_ROUTE)
}

fn decide_with(
    meta: &EffectiveMeta,
    session: &Session,
    login: &str,
    home: &str,
) -> NavigationDecision {
    if !meta.requires_auth {
        return NavigationDecision::Proceed;
    }
    if !session.has_token() {
        return NavigationDecision::RedirectTo(login.to_owned());
    }
    if meta.requires_admin && !session.is_admin() {
        return NavigationDecision::RedirectTo(home.to_owned());
    }
    NavigationDecision::Proceed
}

/// The decision rule bound to a session store, ready to run as a
/// pre-navigation hook.
#[derive(Clone)]
pub struct Guard {
    session: Arc<dyn SessionStore>,
    login_route: String,
    home_route: String,
}

impl Guard {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            session,
            login_route: LOGIN_ROUTE.to_owned(),
            home_route: HOME_ROUTE.to_owned(),
        }
    }

    /// Route to send unauthenticated users to. Defaults to `Login`.
    pub fn login_route(mut self, name: &str) -> Self {
        self.login_route = name.to_owned();
        self
    }

    /// Route to send non-admin users to. Defaults to `ProductList`.
    pub fn home_route(mut self, name: &str) -> Self {
        self.home_route = name.to_owned();
        self
    }

    /// Evaluates the guard for a resolved navigation target. Reads the
    /// session as it is right now.
    pub fn before_each(&self, target: &ResolvedRoute) -> NavigationDecision {
        let session = Session::read(self.session.as_ref());
        let decision = decide_with(&target.meta, &session, &self.login_route, &self.home_route);
        if let NavigationDecision::RedirectTo(ref to) = decision {
            debug!(from = %target.path, to = %to, "navigation redirected");
        }
        decision
    }
}
