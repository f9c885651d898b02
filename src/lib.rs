//! # kiosk
//!
//! Session-aware navigation and request middleware for a product-catalog
//! client. Two decision layers, one shared session store:
//!
//! - a **navigation guard** that decides, before a route mounts, whether the
//!   current session may see it;
//! - a **request pipeline** that injects the bearer credential into every
//!   backend call and classifies every outcome into a closed error set.
//!
//! ## The contract
//!
//! kiosk consumes a credential and a role flag that something else issued.
//! It does not log in, refresh tokens, or re-check permissions against the
//! server. It trusts the session until the server says 401, then forgets the
//! token and sends the user to `/login`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kiosk::{Client, ClientConfig, Guard, MemorySession, Navigator, RouteCatalog, SessionStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session: Arc<dyn SessionStore> = Arc::new(MemorySession::new());
//!     let nav = Arc::new(Navigator::new(RouteCatalog::storefront(), Guard::new(session.clone())));
//!
//!     let config = ClientConfig::default().origin("http://localhost:8080");
//!     let client = Client::new(config, session.clone(), nav.clone());
//!
//!     // Anonymous: the admin area bounces to the login page.
//!     let view = nav.push("/admin/dashboard").await.unwrap();
//!     assert_eq!(view.component(), "User/Login");
//!
//!     match client.get("/api/products").await {
//!         Ok(body) => println!("{}", body.text()),
//!         Err(e) => eprintln!("{e} ({})", e.kind()),
//!     }
//! }
//! ```

mod client;
mod config;
mod error;
mod method;
mod request;
mod response;

pub mod catalog;
pub mod guard;
pub mod middleware;
pub mod navigator;
pub mod route;
pub mod session;
pub mod transport;
pub mod view;

pub use catalog::{ResolvedRoute, RouteCatalog};
pub use client::Client;
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{BoxError, ClassifiedError, Error, ErrorKind};
pub use guard::{Guard, NavigationDecision, decide};
pub use method::Method;
pub use middleware::{HardRedirect, Pipeline};
pub use navigator::{Location, Navigator};
pub use request::{Request, RequestBuilder};
pub use response::{Body, Reply};
pub use route::{EffectiveMeta, RouteDescriptor, RouteMeta};
pub use session::{FileSession, MemorySession, Session, SessionStore};
pub use transport::{HyperTransport, Outcome, Transport};
pub use view::{View, ViewRef};
