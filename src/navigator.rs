//! The navigation pipeline.
//!
//! [`Navigator::push`] is the in-app, guarded way to move: resolve the path,
//! ask the [`Guard`] once, follow a redirect if told to (the redirect target
//! is a navigation of its own and is guarded again), then mount the view.
//!
//! [`HardRedirect::assign`] is the other way: a full top-level jump that
//! replaces the current location without asking the guard. The middleware
//! uses it after a 401.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::catalog::{ResolvedRoute, RouteCatalog};
use crate::error::Error;
use crate::guard::{Guard, NavigationDecision};
use crate::middleware::HardRedirect;
use crate::view::View;

/// Redirect hops allowed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 8;

/// Where the navigator currently is.
#[derive(Clone, Debug)]
pub struct Location {
    pub route: ResolvedRoute,
    /// `true` when reached by hard redirect rather than a guarded push.
    pub hard: bool,
}

pub struct Navigator {
    catalog: RouteCatalog,
    guard: Guard,
    current: Mutex<Option<Location>>,
}

impl Navigator {
    pub fn new(catalog: RouteCatalog, guard: Guard) -> Self {
        Self { catalog, guard, current: Mutex::new(None) }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn current(&self) -> Option<Location> {
        self.location().clone()
    }

    /// Navigates to `path` and returns the mounted view.
    ///
    /// Fails if the path, or a redirect's route name, is unknown, or if
    /// redirects keep bouncing for more than [`MAX_REDIRECTS`] hops.
    pub async fn push(&self, path: &str) -> Result<Arc<View>, Error> {
        let mut target = self.resolve(path)?;

        for _ in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&target) {
                NavigationDecision::Proceed => {
                    let view = target.view.resolve().await;
                    info!(route = %target.name, path = %target.path, "navigated");
                    *self.location() = Some(Location { route: target, hard: false });
                    return Ok(view);
                }
                NavigationDecision::RedirectTo(name) => {
                    let to = self.catalog
                        .path_of(&name)
                        .ok_or_else(|| Error::UnknownRouteName(name.clone()))?;
                    target = self.resolve(to)?;
                }
            }
        }

        Err(Error::RedirectLoop(path.to_owned()))
    }

    /// Mounts the view for the current location, loading it if needed.
    pub async fn view(&self) -> Option<Arc<View>> {
        let route = self.location().as_ref()?.route.clone();
        Some(route.view.resolve().await)
    }

    fn resolve(&self, path: &str) -> Result<ResolvedRoute, Error> {
        self.catalog.resolve(path).ok_or_else(|| Error::RouteNotFound(path.to_owned()))
    }

    fn location(&self) -> MutexGuard<'_, Option<Location>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HardRedirect for Navigator {
    fn assign(&self, path: &str) {
        match self.catalog.resolve(path) {
            Some(route) => {
                info!(path, "hard redirect");
                *self.location() = Some(Location { route, hard: true });
            }
            None => warn!(path, "hard redirect to unknown path ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteDescriptor, RouteMeta};
    use crate::session::{MemorySession, ROLE_KEY, SessionStore, TOKEN_KEY};
    use crate::view::ViewRef;

    fn navigator(store: Arc<MemorySession>) -> Navigator {
        Navigator::new(RouteCatalog::storefront(), Guard::new(store))
    }

    fn signed_in(role: &'static str) -> Arc<MemorySession> {
        Arc::new(MemorySession::with([(TOKEN_KEY, "abc"), (ROLE_KEY, role)]))
    }

    #[tokio::test]
    async fn anonymous_admin_visit_lands_on_login() {
        let nav = navigator(Arc::new(MemorySession::new()));
        let view = nav.push("/admin/dashboard").await.unwrap();
        assert_eq!(view.component(), "User/Login");
        assert_eq!(nav.current().unwrap().route.name, "Login");
    }

    #[tokio::test]
    async fn standard_user_is_sent_home_from_admin() {
        let nav = navigator(signed_in("0"));
        let view = nav.push("/admin/products").await.unwrap();
        assert_eq!(view.component(), "User/ProductList");
        assert_eq!(nav.current().unwrap().route.path, "/");
    }

    #[tokio::test]
    async fn admin_reaches_admin_orders() {
        let nav = navigator(signed_in("1"));
        let view = nav.push("/admin/orders").await.unwrap();
        assert_eq!(view.component(), "admin/Orders");
        let here = nav.current().unwrap();
        assert_eq!(here.route.name, "AdminOrders");
        assert!(!here.hard);
    }

    #[tokio::test]
    async fn public_route_needs_no_session() {
        let nav = navigator(Arc::new(MemorySession::new()));
        assert_eq!(nav.push("/cart").await.unwrap().component(), "User/Cart");
    }

    #[tokio::test]
    async fn lenient_spellings_are_still_guarded() {
        for path in ["/admin/", "/admin/dashboard/", "/Admin/Dashboard"] {
            let nav = navigator(Arc::new(MemorySession::new()));
            let view = nav.push(path).await.unwrap();
            assert_eq!(view.component(), "User/Login", "{path}");
            assert_eq!(nav.current().unwrap().route.name, "Login", "{path}");
        }
    }

    #[tokio::test]
    async fn trailing_slash_reaches_public_route() {
        let nav = navigator(Arc::new(MemorySession::new()));
        assert_eq!(nav.push("/cart/").await.unwrap().component(), "User/Cart");
        assert_eq!(nav.current().unwrap().route.name, "Cart");
    }

    #[tokio::test]
    async fn unknown_path_is_an_error() {
        let nav = navigator(Arc::new(MemorySession::new()));
        assert!(matches!(nav.push("/nope").await, Err(Error::RouteNotFound(p)) if p == "/nope"));
        assert!(nav.current().is_none());
    }

    #[tokio::test]
    async fn guarded_login_route_loops() {
        let view = || ViewRef::eager(View::new("x"));
        let catalog = RouteCatalog::new()
            .route(RouteDescriptor::new("/login", "Login", view()).meta(RouteMeta::auth()))
            .route(RouteDescriptor::new("/vault", "Vault", view()).meta(RouteMeta::auth()));
        let nav = Navigator::new(catalog, Guard::new(Arc::new(MemorySession::new())));
        assert!(matches!(nav.push("/vault").await, Err(Error::RedirectLoop(_))));
    }

    #[tokio::test]
    async fn hard_redirect_bypasses_the_guard() {
        let store = signed_in("1");
        let nav = navigator(store.clone());
        nav.push("/admin/users").await.unwrap();

        store.remove(TOKEN_KEY);
        nav.assign("/admin/users");

        let here = nav.current().unwrap();
        assert!(here.hard);
        assert_eq!(here.route.name, "AdminUsers");
        assert_eq!(nav.view().await.unwrap().component(), "admin/Users");
    }
}
