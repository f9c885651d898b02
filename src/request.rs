//! Outgoing HTTP request type.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;

use crate::error::{BoxError, ClassifiedError};
use crate::method::Method;

/// An outgoing request addressed by path relative to the configured origin.
///
/// Build with the method shortcuts or [`Request::builder`]:
///
/// ```rust
/// use kiosk::{Method, Request};
///
/// let req = Request::get("/api/products?page=2");
/// assert_eq!(req.method(), Method::Get);
///
/// let req = Request::builder(Method::Post, "/api/cart")
///     .header("x-client", "kiosk")
///     .json(&serde_json::json!({ "productId": 7, "quantity": 1 }));
/// assert_eq!(req.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    // Set when the builder could not produce the request. Surfaces as a
    // SetupError when the request is sent.
    pub(crate) invalid: Option<BoxError>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            invalid: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self { Self::new(Method::Get, path) }
    pub fn post(path: impl Into<String>) -> Self { Self::new(Method::Post, path) }
    pub fn put(path: impl Into<String>) -> Self { Self::new(Method::Put, path) }
    pub fn patch(path: impl Into<String>) -> Self { Self::new(Method::Patch, path) }
    pub fn delete(path: impl Into<String>) -> Self { Self::new(Method::Delete, path) }

    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder { req: Self::new(method, path) }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    /// Converts to a wire request for the absolute `url`.
    ///
    /// Fails with [`ClassifiedError::SetupError`] on anything that cannot go
    /// out: an earlier builder failure, a URL with no scheme or host, a header
    /// name or value the wire format rejects.
    pub(crate) fn into_http(self, url: &str) -> Result<http::Request<Full<Bytes>>, ClassifiedError> {
        if let Some(e) = self.invalid {
            return Err(ClassifiedError::SetupError(e));
        }

        let uri: http::Uri = url.parse().map_err(ClassifiedError::setup)?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ClassifiedError::setup(format!(
                "`{url}` is not an absolute URL; configure an origin"
            )));
        }

        let mut builder = http::Request::builder()
            .method(http::Method::from(self.method))
            .uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(self.body)).map_err(ClassifiedError::setup)
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`]. Terminated by a body method.
pub struct RequestBuilder {
    req: Request,
}

impl RequestBuilder {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.req.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with a JSON body (`application/json`).
    ///
    /// A value that fails to serialize does not panic: the request is kept
    /// and rejects with a SetupError when sent.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Request {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.req.body = Bytes::from(bytes),
            Err(e) => self.req.invalid = Some(e.into()),
        }
        self.req.set_header("content-type", "application/json");
        self.req
    }

    /// Terminate with raw bytes and an explicit content type.
    pub fn bytes(mut self, content_type: &str, body: impl Into<Bytes>) -> Request {
        self.req.body = body.into();
        self.req.set_header("content-type", content_type);
        self.req
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Request {
        self.req
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut req = Request::builder(Method::Get, "/api/me")
            .header("authorization", "Basic old")
            .no_body();
        req.set_header("Authorization", "Bearer new");
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn into_http_carries_method_headers_and_body() {
        let req = Request::builder(Method::Put, "/api/cart/3")
            .json(&serde_json::json!({ "quantity": 2 }));
        let wire = req.into_http("http://shop.test/api/cart/3").unwrap();
        assert_eq!(wire.method(), http::Method::PUT);
        assert_eq!(wire.uri().path(), "/api/cart/3");
        assert_eq!(wire.headers()["content-type"], "application/json");
    }

    #[test]
    fn relative_url_is_a_setup_error() {
        let err = Request::get("/api/products").into_http("/api/products").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SetupError);
    }

    #[test]
    fn bad_header_value_is_a_setup_error() {
        let req = Request::builder(Method::Get, "/x").header("x-bad", "line\nbreak").no_body();
        let err = req.into_http("http://shop.test/x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SetupError);
    }

    #[test]
    fn unserializable_body_is_deferred_to_send() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], 1);
        let req = Request::builder(Method::Post, "/x").json(&map);
        let err = req.into_http("http://shop.test/x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SetupError);
    }
}
