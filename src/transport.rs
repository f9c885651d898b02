//! The wire.
//!
//! A [`Transport`] takes a fully built request and reports one of three raw
//! outcomes. It never interprets status codes; that is the middleware's job.
//!
//! [`HyperTransport`] is the default: a pooled hyper client over plain HTTP
//! with the whole exchange (connect, send, follow redirects, read body)
//! bounded by the configured timeout.
//!
//! ## Redirects
//!
//! | Status              | Next hop                                   |
//! |---------------------|--------------------------------------------|
//! | 301, 302 after POST | `GET`, body dropped                        |
//! | 303                 | `GET`, body dropped                        |
//! | 307, 308            | same method, same body                     |
//! | 3xx, no `location`  | not followed; the reply is the outcome     |
//!
//! At most [`MAX_REDIRECTS`] hops are followed; one more is a `NoReply`.
//! `authorization` is dropped when a hop leaves the original host.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, StatusCode, Uri};
use http_body_util::Full;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use crate::error::BoxError;
use crate::response::Reply;

/// Redirect hops [`HyperTransport`] follows before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Heap-allocated, type-erased transport future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Raw result of one exchange.
#[derive(Debug)]
pub enum Outcome {
    /// The server answered, with any status.
    Reply(Reply),
    /// The request may have left but no answer arrived.
    NoReply(BoxError),
    /// The request never left.
    SetupFailed(BoxError),
}

/// Sends requests. Implementations must be shareable across tasks.
pub trait Transport: Send + Sync {
    fn send(&self, req: http::Request<Full<Bytes>>, timeout: Duration) -> BoxFuture<Outcome>;
}

/// Default transport over `hyper-util`'s pooled client.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self { client: HyperClient::builder(TokioExecutor::new()).build_http() }
    }
}

impl Default for HyperTransport {
    fn default() -> Self { Self::new() }
}

impl Transport for HyperTransport {
    fn send(&self, req: http::Request<Full<Bytes>>, timeout: Duration) -> BoxFuture<Outcome> {
        let client = self.client.clone();
        Box::pin(async move {
            // The plain connector cannot speak TLS; refuse before dialing.
            if req.uri().scheme() != Some(&http::uri::Scheme::HTTP) {
                return Outcome::SetupFailed(
                    format!("unsupported scheme in `{}`", req.uri()).into(),
                );
            }

            let exchange = follow(&client, req);

            match tokio::time::timeout(timeout, exchange).await {
                Ok(Ok(reply)) => Outcome::Reply(reply),
                Ok(Err(e)) => Outcome::NoReply(e),
                Err(_) => Outcome::NoReply(
                    format!("timeout of {}ms exceeded", timeout.as_millis()).into(),
                ),
            }
        })
    }
}

// ── Redirect following ────────────────────────────────────────────────────────

async fn follow(
    client: &HyperClient<HttpConnector, Full<Bytes>>,
    req: http::Request<Full<Bytes>>,
) -> Result<Reply, BoxError> {
    let (parts, mut body) = req.into_parts();
    let (mut method, mut uri, mut headers) = (parts.method, parts.uri, parts.headers);
    let origin = uri.authority().cloned();

    for _ in 0..=MAX_REDIRECTS {
        let mut hop = http::Request::new(body.clone());
        *hop.method_mut() = method.clone();
        *hop.uri_mut() = uri.clone();
        *hop.headers_mut() = headers.clone();

        let res = client.request(hop).await?;
        let status = res.status();
        let Some(location) = redirect_target(status, res.headers()) else {
            return Ok(Reply::read(res).await?);
        };
        drop(res);

        let next = resolve_location(&uri, &location)?;
        if next.scheme() != Some(&http::uri::Scheme::HTTP) {
            return Err(format!("redirected to unsupported scheme in `{next}`").into());
        }
        if next.authority() != origin.as_ref() {
            headers.remove(AUTHORIZATION);
        }
        if status == StatusCode::SEE_OTHER
            || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
                && method == http::Method::POST)
        {
            method = http::Method::GET;
            body = Full::new(Bytes::new());
            headers.remove(CONTENT_TYPE);
            headers.remove(CONTENT_LENGTH);
        }

        debug!(status = status.as_u16(), from = %uri, to = %next, "following redirect");
        uri = next;
    }

    Err(format!("maximum number of redirects exceeded ({MAX_REDIRECTS})").into())
}

/// The `location` of a followable redirect, if `status` is one.
fn redirect_target(status: StatusCode, headers: &HeaderMap) -> Option<String> {
    match status.as_u16() {
        301 | 302 | 303 | 307 | 308 => {}
        _ => return None,
    }
    headers.get(LOCATION)?.to_str().ok().map(str::to_owned)
}

/// Resolves `location` against the URI that produced it.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri, BoxError> {
    if location.contains("://") {
        return Ok(location.parse::<Uri>()?);
    }

    let path = if location.starts_with('/') {
        location.to_owned()
    } else {
        let dir = base.path().rsplit_once('/').map_or("", |(dir, _)| dir);
        format!("{dir}/{location}")
    };

    let mut parts = base.clone().into_parts();
    parts.path_and_query = Some(path.parse::<http::uri::PathAndQuery>()?);
    Ok(Uri::from_parts(parts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Uri {
        "http://shop.test:8080/api/orders/7?full=1".parse().unwrap()
    }

    #[test]
    fn absolute_path_keeps_origin() {
        let next = resolve_location(&base(), "/api/new?x=1").unwrap();
        assert_eq!(next.to_string(), "http://shop.test:8080/api/new?x=1");
    }

    #[test]
    fn relative_location_replaces_last_segment() {
        let next = resolve_location(&base(), "8").unwrap();
        assert_eq!(next.to_string(), "http://shop.test:8080/api/orders/8");
    }

    #[test]
    fn full_url_is_taken_as_is() {
        let next = resolve_location(&base(), "http://cdn.test/img").unwrap();
        assert_eq!(next.authority().unwrap().as_str(), "cdn.test");
    }

    #[test]
    fn only_redirect_statuses_with_location_are_followed() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, "/next".parse().unwrap());
        assert_eq!(redirect_target(StatusCode::FOUND, &headers).as_deref(), Some("/next"));
        assert_eq!(redirect_target(StatusCode::NOT_MODIFIED, &headers), None);
        assert_eq!(redirect_target(StatusCode::FOUND, &HeaderMap::new()), None);
    }
}
