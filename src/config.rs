use std::env;
use std::time::Duration;

use tracing::warn;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// ClientConfig
///
/// Where backend calls go and how long they may take. Immutable once the
/// [`Client`](crate::Client) is built.
///
/// The empty defaults mean "same origin": request paths are used as given.
/// A standalone process has no page origin to inherit, so it sets `origin`
/// (e.g. `http://localhost:8080`) and every relative path is resolved
/// against it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    // Scheme + host (+ port). Empty means paths are used verbatim.
    pub origin: String,
    // Path prefix prepended to every request path.
    pub base_path: String,
    // Applied to each request as a whole: connect, send, and read.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            base_path: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// from_env
    ///
    /// Reads `KIOSK_ORIGIN`, `KIOSK_BASE_PATH` and `KIOSK_TIMEOUT_MS`. Unset
    /// variables keep their defaults; an unparsable timeout is logged and
    /// ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origin) = env::var("KIOSK_ORIGIN") {
            config.origin = origin;
        }
        if let Ok(base) = env::var("KIOSK_BASE_PATH") {
            config.base_path = base;
        }
        if let Ok(raw) = env::var("KIOSK_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => config.timeout = Duration::from_millis(ms),
                Err(e) => warn!(value = %raw, "ignoring KIOSK_TIMEOUT_MS: {e}"),
            }
        }
        config
    }

    pub fn origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_owned();
        self
    }

    pub fn base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.to_owned();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves a request path to the URL it is sent to. Absolute URLs pass
    /// through untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let origin = self.origin.trim_end_matches('/');
        let base = self.base_path.trim_matches('/');
        let path = path.trim_start_matches('/');
        match (base.is_empty(), path.is_empty()) {
            (true, _)      => format!("{origin}/{path}"),
            (false, true)  => format!("{origin}/{base}"),
            (false, false) => format!("{origin}/{base}/{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_same_origin_with_ten_second_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(10_000));
        assert_eq!(config.url_for("/api/products"), "/api/products");
    }

    #[test]
    fn url_for_joins_origin_base_and_path() {
        let config = ClientConfig::default().origin("http://shop.test/").base_path("/api/");
        assert_eq!(config.url_for("/products/1"), "http://shop.test/api/products/1");
        assert_eq!(config.url_for("products"), "http://shop.test/api/products");
        assert_eq!(config.url_for(""), "http://shop.test/api");
        assert_eq!(config.url_for("https://cdn.test/a.png"), "https://cdn.test/a.png");
    }
}
