//! Route descriptors and metadata inheritance.
//!
//! Routes form a tree. Each node declares zero or more access flags; a node's
//! *effective* metadata is every declaration on the path from the root down
//! to it, with the deeper declaration winning for the same key.
//!
//! ```text
//! /admin            requires_auth = true, requires_admin = true
//! └── dashboard     (nothing declared)
//!                   effective: requires_auth = true, requires_admin = true
//! ```

use crate::view::ViewRef;

// ── Metadata ──────────────────────────────────────────────────────────────────

/// Flags as declared on one node. `None` means "not declared here".
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RouteMeta {
    pub requires_auth: Option<bool>,
    pub requires_admin: Option<bool>,
}

impl RouteMeta {
    /// Declares nothing.
    pub const NONE: Self = Self { requires_auth: None, requires_admin: None };

    /// Signed-in users only.
    pub const fn auth() -> Self {
        Self { requires_auth: Some(true), requires_admin: None }
    }

    /// Signed-in administrators only.
    pub const fn admin() -> Self {
        Self { requires_auth: Some(true), requires_admin: Some(true) }
    }

    /// Layers `child` over `self`: the child's declarations win.
    pub fn overlay(self, child: RouteMeta) -> RouteMeta {
        RouteMeta {
            requires_auth: child.requires_auth.or(self.requires_auth),
            requires_admin: child.requires_admin.or(self.requires_admin),
        }
    }
}

/// Flags after inheritance. Undeclared flags are `false`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct EffectiveMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl From<RouteMeta> for EffectiveMeta {
    fn from(meta: RouteMeta) -> Self {
        Self {
            requires_auth: meta.requires_auth.unwrap_or(false),
            requires_admin: meta.requires_admin.unwrap_or(false),
        }
    }
}

/// Folds an ancestor chain, root first, into effective metadata.
pub fn merge<'a>(chain: impl IntoIterator<Item = &'a RouteMeta>) -> EffectiveMeta {
    chain.into_iter()
        .fold(RouteMeta::NONE, |acc, meta| acc.overlay(*meta))
        .into()
}

// ── RouteDescriptor ───────────────────────────────────────────────────────────

/// One node of the route tree.
///
/// Child paths are relative to their parent (`"dashboard"` under `"/admin"`)
/// unless they start with `/`. Path parameters use `{name}` syntax.
#[derive(Clone, Debug)]
pub struct RouteDescriptor {
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) view: ViewRef,
    pub(crate) meta: RouteMeta,
    pub(crate) children: Vec<RouteDescriptor>,
}

impl RouteDescriptor {
    pub fn new(path: &str, name: &str, view: ViewRef) -> Self {
        Self {
            path: path.to_owned(),
            name: name.to_owned(),
            view,
            meta: RouteMeta::NONE,
            children: Vec::new(),
        }
    }

    /// Sets this node's declared metadata. Returns `self` for chaining.
    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Appends a child route. Returns `self` for chaining.
    pub fn child(mut self, child: RouteDescriptor) -> Self {
        self.children.push(child);
        self
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn name(&self) -> &str { &self.name }
    pub fn view(&self) -> &ViewRef { &self.view }
    pub fn declared_meta(&self) -> RouteMeta { self.meta }
    pub fn children(&self) -> &[RouteDescriptor] { &self.children }
}

/// Joins a child path onto its parent's full path.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return child.to_owned();
    }
    let parent = parent.trim_end_matches('/');
    if child.is_empty() {
        return if parent.is_empty() { "/".to_owned() } else { parent.to_owned() };
    }
    format!("{parent}/{child}")
}
