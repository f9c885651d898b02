//! Request middleware.
//!
//! Every backend call runs through one explicit, ordered pipeline:
//!
//! ```text
//! Request ─► Outbound stages ─► wire ─► Transport ─► Outcome
//!                                                      │
//!          Result<Body, ClassifiedError> ◄─ Inbound ◄─ classify
//! ```
//!
//! Each stage is a plain value transform. An outbound stage returns the
//! (possibly modified) request or a classified error; an inbound stage gets
//! the classified result and returns it, applying side effects on the way.
//! Inbound stages never turn an error into a success: whatever the server
//! said, the caller hears it.
//!
//! The standard pipeline:
//!
//! | Stage | Direction | Job |
//! |---|---|---|
//! | [`BearerAuth`] | outbound | attach `Authorization: Bearer <token>` when signed in |
//! | [`ErrorReporter`] | inbound | log a diagnostic for every failure |
//! | [`SessionReset`] | inbound | on 401: drop the token, hard-redirect to `/login` |

use std::sync::Arc;

use crate::error::ClassifiedError;
use crate::request::Request;
use crate::response::Body;
use crate::session::SessionStore;
use crate::transport::Outcome;

pub mod auth;
pub mod report;
pub mod session;

pub use auth::BearerAuth;
pub use report::ErrorReporter;
pub use session::{HardRedirect, SessionReset};

// ── Stage traits ──────────────────────────────────────────────────────────────

/// A transform applied to every request before it is sent.
pub trait Outbound: Send + Sync {
    fn on_request(&self, req: Request) -> Result<Request, ClassifiedError>;
}

/// A transform applied to every classified result before the caller sees it.
pub trait Inbound: Send + Sync {
    fn on_response(&self, result: Result<Body, ClassifiedError>) -> Result<Body, ClassifiedError>;
}

// ── classify ──────────────────────────────────────────────────────────────────

/// Maps a raw transport outcome onto the closed error taxonomy.
///
/// | Outcome | Result |
/// |---|---|
/// | 2xx reply | `Ok(body)` |
/// | 401 / 403 / 404 / 500 | the matching variant |
/// | any other status | `OtherStatus(code)` |
/// | no reply | `NoResponse` |
/// | never sent | `SetupError` |
pub fn classify(outcome: Outcome) -> Result<Body, ClassifiedError> {
    let reply = match outcome {
        Outcome::Reply(reply) if reply.is_success() => return Ok(reply.into_body()),
        Outcome::Reply(reply) => reply,
        Outcome::NoReply(e) => return Err(ClassifiedError::NoResponse(e)),
        Outcome::SetupFailed(e) => return Err(ClassifiedError::SetupError(e)),
    };
    Err(match reply.status() {
        401  => ClassifiedError::Unauthorized(reply),
        403  => ClassifiedError::Forbidden(reply),
        404  => ClassifiedError::NotFound(reply),
        500  => ClassifiedError::ServerError(reply),
        code => ClassifiedError::OtherStatus(code, reply),
    })
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Ordered outbound and inbound stages. Stages run in registration order.
#[derive(Clone, Default)]
pub struct Pipeline {
    outbound: Vec<Arc<dyn Outbound>>,
    inbound: Vec<Arc<dyn Inbound>>,
}

impl Pipeline {
    /// A pipeline with no stages: requests go out untouched, results come
    /// back classified but otherwise untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credential injection, failure logging, and 401 sign-out.
    pub fn standard(session: Arc<dyn SessionStore>, redirect: Arc<dyn HardRedirect>) -> Self {
        Self::new()
            .outbound(BearerAuth::new(Arc::clone(&session)))
            .inbound(ErrorReporter)
            .inbound(SessionReset::new(session, redirect))
    }

    pub fn outbound(mut self, stage: impl Outbound + 'static) -> Self {
        self.outbound.push(Arc::new(stage));
        self
    }

    pub fn inbound(mut self, stage: impl Inbound + 'static) -> Self {
        self.inbound.push(Arc::new(stage));
        self
    }

    /// Runs the outbound stages. The first error short-circuits.
    pub fn prepare(&self, req: Request) -> Result<Request, ClassifiedError> {
        self.outbound.iter().try_fold(req, |req, stage| stage.on_request(req))
    }

    /// Runs the inbound stages over an already classified result.
    pub fn settle(&self, result: Result<Body, ClassifiedError>) -> Result<Body, ClassifiedError> {
        self.inbound.iter().fold(result, |result, stage| stage.on_response(result))
    }
}
