//! View references and deferred loading.
//!
//! A route points at the view it mounts through a [`ViewRef`]. Most views are
//! not needed until the user first navigates to them, so a `ViewRef` is
//! either already loaded or a memoized factory:
//!
//! ```text
//! ViewRef::deferred(|| async { View::new("admin/Orders") })
//!        ↓ first navigation
//! loader.load()                                   ← one vtable dispatch
//!        ↓
//! OnceCell::get_or_init                           ← result cached
//!        ↓ every later navigation
//! Arc<View> clone                                 ← no load
//! ```
//!
//! There is no invalidation: once loaded, a view stays loaded for the life
//! of the catalog.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

// ── View ──────────────────────────────────────────────────────────────────────

/// Handle to a mountable view, identified by its component name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct View {
    component: String,
}

impl View {
    pub fn new(component: impl Into<String>) -> Self {
        Self { component: component.into() }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

// ── Loader type erasure ───────────────────────────────────────────────────────

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = View> + Send + 'static>>;

/// `#[doc(hidden)] pub` because it appears in [`Loader::into_boxed_loader`].
#[doc(hidden)]
pub trait ErasedLoader {
    fn load(&self) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedLoader = Arc<dyn ErasedLoader + Send + Sync + 'static>;

/// Implemented for every `Fn() -> impl Future<Output = View>`.
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Loader: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_loader(self) -> BoxedLoader;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = View> + Send + 'static,
{
}

impl<F, Fut> Loader for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = View> + Send + 'static,
{
    fn into_boxed_loader(self) -> BoxedLoader {
        Arc::new(FnLoader(self))
    }
}

struct FnLoader<F>(F);

impl<F, Fut> ErasedLoader for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = View> + Send + 'static,
{
    fn load(&self) -> BoxFuture {
        Box::pin((self.0)())
    }
}

// ── ViewRef ───────────────────────────────────────────────────────────────────

/// What a route mounts. Cloning shares the memoized handle.
#[derive(Clone)]
pub enum ViewRef {
    Eager(Arc<View>),
    Deferred(Arc<Deferred>),
}

/// A view that loads on first access.
pub struct Deferred {
    loader: BoxedLoader,
    cell: OnceCell<Arc<View>>,
}

impl ViewRef {
    pub fn eager(view: View) -> Self {
        Self::Eager(Arc::new(view))
    }

    pub fn deferred(loader: impl Loader) -> Self {
        Self::Deferred(Arc::new(Deferred {
            loader: loader.into_boxed_loader(),
            cell: OnceCell::new(),
        }))
    }

    /// Returns the view, loading it first if this is the first access.
    /// Concurrent first accesses share a single load.
    pub async fn resolve(&self) -> Arc<View> {
        match self {
            Self::Eager(view) => Arc::clone(view),
            Self::Deferred(deferred) => {
                let view = deferred.cell
                    .get_or_init(|| async {
                        let view = deferred.loader.load().await;
                        debug!(component = view.component(), "view loaded");
                        Arc::new(view)
                    })
                    .await;
                Arc::clone(view)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        match self {
            Self::Eager(_) => true,
            Self::Deferred(deferred) => deferred.cell.initialized(),
        }
    }
}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(view) => f.debug_tuple("Eager").field(&view.component).finish(),
            Self::Deferred(deferred) => f
                .debug_struct("Deferred")
                .field("loaded", &deferred.cell.get().map(|v| v.component()))
                .finish(),
        }
    }
}
