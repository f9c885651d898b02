//! Storefront walk-through: guarded navigation plus a few backend calls.
//!
//! Run with:
//!   RUST_LOG=kiosk=debug KIOSK_ORIGIN=http://localhost:8080 cargo run --example storefront
//!
//! Pass a token to start signed in, and `admin` to raise the role flag:
//!   cargo run --example storefront -- <token> admin
//!
//! The session is kept in `kiosk-session.json` next to the working directory,
//! so a second run starts where the first one left off.

use std::sync::Arc;

use kiosk::session::{sign_in, sign_out};
use kiosk::{Client, ClientConfig, FileSession, Guard, Navigator, RouteCatalog, SessionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let session: Arc<dyn SessionStore> = Arc::new(FileSession::open("kiosk-session.json")?);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("logout") => sign_out(session.as_ref()),
        Some(token) => sign_in(session.as_ref(), token, args.next().as_deref() == Some("admin")),
        None => {}
    }

    let nav = Arc::new(Navigator::new(RouteCatalog::storefront(), Guard::new(session.clone())));
    let client = Client::new(ClientConfig::from_env(), session.clone(), nav.clone());

    for path in ["/", "/product/1", "/cart", "/admin/dashboard", "/admin/orders/42"] {
        let view = nav.push(path).await?;
        println!("{path:<20} -> {}", view.component());
    }

    for path in ["/api/products", "/api/user/info", "/api/admin/orders"] {
        match client.get(path).await {
            Ok(body) => println!("GET {path:<20} ok ({} bytes)", body.bytes().len()),
            Err(e) => println!("GET {path:<20} {} ({e})", e.kind()),
        }
    }

    if let Some(here) = nav.current() {
        println!("now at {} (hard redirect: {})", here.route.path, here.hard);
    }
    Ok(())
}
