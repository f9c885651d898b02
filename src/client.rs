//! The backend client.
//!
//! One call, in order:
//!
//! 1. outbound stages transform the [`Request`];
//! 2. the request is resolved against [`ClientConfig`] and handed to the
//!    [`Transport`] with the configured timeout;
//! 3. the outcome is classified and run through the inbound stages;
//! 4. the caller gets the [`Body`] or the [`ClassifiedError`].
//!
//! A failure at step 1 or 2 skips the wire but still goes through step 3, so
//! setup errors are logged like every other failure. Concurrent calls share
//! nothing but the session store; there is no queueing or de-duplication.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClassifiedError;
use crate::middleware::{self, HardRedirect, Pipeline};
use crate::method::Method;
use crate::request::Request;
use crate::response::Body;
use crate::session::SessionStore;
use crate::transport::{HyperTransport, Transport};

/// Session-aware HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
}

impl Client {
    /// The standard client: hyper transport, bearer credentials from
    /// `session`, failure logging, and sign-out + `redirect` on 401.
    pub fn new(
        config: ClientConfig,
        session: Arc<dyn SessionStore>,
        redirect: Arc<dyn HardRedirect>,
    ) -> Self {
        Self::with_parts(config, Arc::new(HyperTransport::new()), Pipeline::standard(session, redirect))
    }

    /// A client with an explicit transport and pipeline.
    pub fn with_parts(config: ClientConfig, transport: Arc<dyn Transport>, pipeline: Pipeline) -> Self {
        Self { config, transport, pipeline }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `req` through the pipeline.
    pub async fn send(&self, req: Request) -> Result<Body, ClassifiedError> {
        debug!(method = %req.method(), path = %req.path(), "request");

        let wire = self.pipeline.prepare(req).and_then(|req| {
            let url = self.config.url_for(req.path());
            req.into_http(&url)
        });

        let result = match wire {
            Ok(wire) => middleware::classify(self.transport.send(wire, self.config.timeout).await),
            Err(e) => Err(e),
        };

        self.pipeline.settle(result)
    }

    pub async fn get(&self, path: &str) -> Result<Body, ClassifiedError> {
        self.send(Request::get(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Body, ClassifiedError> {
        self.send(Request::delete(path)).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Body, ClassifiedError> {
        self.send(Request::builder(Method::Post, path).json(body)).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Body, ClassifiedError> {
        self.send(Request::builder(Method::Put, path).json(body)).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Body, ClassifiedError> {
        self.send(Request::builder(Method::Patch, path).json(body)).await
    }
}
