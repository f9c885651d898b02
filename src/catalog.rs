//! The route catalog.
//!
//! Flattens a [`RouteDescriptor`] tree into one radix tree keyed by full path
//! pattern. Effective metadata is computed once per route at registration, by
//! merging the ancestor chain, so resolving a path never walks the tree.
//!
//! Matching is lenient the way browser routers are: static segments compare
//! ASCII case-insensitively and one trailing `/` is ignored, so `/Cart/`
//! resolves like `/cart`. Parameter values keep the case they were typed in.

use std::collections::HashMap;

use matchit::Router as MatchitRouter;

use crate::route::{self, EffectiveMeta, RouteDescriptor, RouteMeta};
use crate::view::{View, ViewRef};

/// Route the guard redirects to when a credential is required.
pub const LOGIN_ROUTE: &str = "Login";

/// Route the guard redirects to when admin rights are missing.
pub const HOME_ROUTE: &str = "ProductList";

/// Literal path used for the hard redirect after a 401.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug)]
struct Entry {
    name: String,
    pattern: String,
    view: ViewRef,
    meta: EffectiveMeta,
}

/// A concrete path matched against the catalog.
#[derive(Clone, Debug)]
pub struct ResolvedRoute {
    pub name: String,
    pub pattern: String,
    pub path: String,
    pub params: HashMap<String, String>,
    pub meta: EffectiveMeta,
    pub view: ViewRef,
}

impl ResolvedRoute {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Every route the client knows about.
///
/// Build it once at startup. Each [`RouteCatalog::route`] call returns `self`
/// so registrations chain naturally.
pub struct RouteCatalog {
    tree: MatchitRouter<usize>,
    entries: Vec<Entry>,
    names: HashMap<String, usize>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self { tree: MatchitRouter::new(), entries: Vec::new(), names: HashMap::new() }
    }

    /// Registers a top-level route and all its descendants.
    ///
    /// # Panics
    ///
    /// Panics on an invalid or conflicting path pattern, or a route name that
    /// is already taken. Route tables are static; a broken one is a bug.
    pub fn route(mut self, descriptor: RouteDescriptor) -> Self {
        let mut chain = Vec::new();
        self.add(&descriptor, "", &mut chain);
        self
    }

    fn add(&mut self, descriptor: &RouteDescriptor, parent: &str, chain: &mut Vec<RouteMeta>) {
        let pattern = route::join_path(parent, &descriptor.path);
        chain.push(descriptor.meta);

        let index = self.entries.len();
        if self.names.insert(descriptor.name.clone(), index).is_some() {
            panic!("duplicate route name `{}`", descriptor.name);
        }
        self.tree
            .insert(fold_case(&pattern), index)
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        self.entries.push(Entry {
            name: descriptor.name.clone(),
            pattern: pattern.clone(),
            view: descriptor.view.clone(),
            meta: route::merge(chain.iter()),
        });

        for child in &descriptor.children {
            self.add(child, &pattern, chain);
        }
        chain.pop();
    }

    /// Matches a concrete path (query string and fragment ignored).
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        // ASCII folding keeps byte offsets, so each param slice of `folded`
        // maps onto the same range of `path`.
        let folded = path.to_ascii_lowercase();
        let matched = self.tree.at(&folded).ok()?;
        let entry = &self.entries[*matched.value];
        let params = matched.params.iter()
            .map(|(k, v)| {
                let start = v.as_ptr() as usize - folded.as_ptr() as usize;
                (k.to_owned(), path[start..start + v.len()].to_owned())
            })
            .collect();
        Some(ResolvedRoute {
            name: entry.name.clone(),
            pattern: entry.pattern.clone(),
            path: path.to_owned(),
            params,
            meta: entry.meta,
            view: entry.view.clone(),
        })
    }

    /// Path pattern registered under `name`.
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(|&i| self.entries[i].pattern.as_str())
    }

    /// Effective metadata of the route registered under `name`.
    pub fn meta_of(&self, name: &str) -> Option<EffectiveMeta> {
        self.names.get(name).map(|&i| self.entries[i].meta)
    }

    /// Route names in registration order (parents before children).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// The product-catalog route table: public shop pages, signed-in user
    /// pages, and the admin area.
    pub fn storefront() -> Self {
        Self::new()
            .route(RouteDescriptor::new("/", HOME_ROUTE, ViewRef::eager(View::new("User/ProductList"))))
            .route(RouteDescriptor::new("/product/{id}", "ProductDetail", lazy("User/ProductDetail")))
            .route(RouteDescriptor::new(LOGIN_PATH,      LOGIN_ROUTE,     lazy("User/Login")))
            .route(RouteDescriptor::new("/register",     "Register",      lazy("User/Register")))
            .route(RouteDescriptor::new("/cart",         "Cart",          lazy("User/Cart")))
            .route(RouteDescriptor::new("/orders",       "Orders",        lazy("User/Orders")))
            .route(RouteDescriptor::new("/profile",      "Profile",       lazy("User/Profile")))
            .route(RouteDescriptor::new("/favorites",    "Favorites",     lazy("User/Favorites")))
            .route(
                RouteDescriptor::new("/admin", "Admin", lazy("admin/AdminLayout"))
                    .meta(RouteMeta::admin())
                    .child(RouteDescriptor::new("dashboard",   "AdminDashboard",   lazy("admin/Dashboard")))
                    .child(RouteDescriptor::new("products",    "AdminProducts",    lazy("admin/Products")))
                    .child(RouteDescriptor::new("categories",  "AdminCategories",  lazy("admin/CategoryManager")))
                    .child(RouteDescriptor::new("orders",      "AdminOrders",      lazy("admin/Orders")))
                    .child(RouteDescriptor::new("orders/{id}", "AdminOrderDetail", lazy("admin/OrderDetail")))
                    .child(RouteDescriptor::new("users",       "AdminUsers",       lazy("admin/Users"))),
            )
    }
}

impl Default for RouteCatalog {
    fn default() -> Self { Self::new() }
}

/// Lower-cases the static parts of a pattern, leaving `{param}` names alone.
fn fold_case(pattern: &str) -> String {
    let mut depth = 0usize;
    pattern.chars()
        .map(|c| {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth == 0 { c.to_ascii_lowercase() } else { c }
        })
        .collect()
}

fn lazy(component: &'static str) -> ViewRef {
    ViewRef::deferred(move || async move { View::new(component) })
}
