//! Inbound response types.
//!
//! A [`Reply`] is what came back over the wire: status, headers, body. Callers
//! of [`Client`](crate::Client) only ever see a [`Body`] on success; the reply
//! itself surfaces only inside a [`ClassifiedError`](crate::ClassifiedError).

use bytes::Bytes;
use serde::de::DeserializeOwned;

// ── Reply ─────────────────────────────────────────────────────────────────────

/// A complete server reply, exactly as received.
#[derive(Clone, Debug)]
pub struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Reply {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Drops status and headers, keeping only the payload.
    pub fn into_body(self) -> Body {
        Body(self.body)
    }

    pub(crate) async fn read(
        res: http::Response<hyper::body::Incoming>,
    ) -> Result<Self, hyper::Error> {
        use http_body_util::BodyExt;

        let (parts, incoming) = res.into_parts();
        let headers = header_pairs(&parts.headers);
        let body = incoming.collect().await?.to_bytes();
        Ok(Self { status: parts.status.as_u16(), headers, body })
    }
}

/// Flattens a header map. Values that are not UTF-8 are decoded lossily
/// rather than dropped.
fn header_pairs(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers.iter()
        .map(|(k, v)| (k.as_str().to_owned(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect()
}

// ── Body ──────────────────────────────────────────────────────────────────────

/// The unwrapped payload of a successful call.
///
/// kiosk does not care what the bytes are. Decode them however the endpoint
/// demands:
///
/// ```rust
/// use kiosk::Body;
///
/// #[derive(serde::Deserialize)]
/// struct Product { id: u64 }
///
/// let body = Body::from_static(br#"{"id":7}"#);
/// let product: Product = body.json().unwrap();
/// assert_eq!(product.id, 7);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Body(Bytes);

impl Body {
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }

    pub fn bytes(&self) -> &Bytes { &self.0 }
    pub fn into_bytes(self) -> Bytes { self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Lossy UTF-8 view of the payload.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.0)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self { Self(bytes) }
}
