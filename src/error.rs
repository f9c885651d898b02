//! Error types.
//!
//! Two families live here and they never mix:
//!
//! - [`ClassifiedError`] is what a backend call rejects with. It is a closed
//!   set: every transport outcome maps to exactly one variant.
//! - [`Error`] surfaces client-side infrastructure failures: unknown routes,
//!   redirect loops, an unreadable session file.

use std::fmt;

use crate::response::Reply;

/// Boxed source error carried by the variants that have no server reply.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ── ClassifiedError ───────────────────────────────────────────────────────────

/// Why a backend call failed.
///
/// Status-derived variants keep the [`Reply`] the server sent so callers can
/// still inspect the error body. `NoResponse` and `SetupError` keep the
/// underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum ClassifiedError {
    /// 401. The stored credential has already been discarded by the time the
    /// caller sees this.
    #[error("unauthorized")]
    Unauthorized(Reply),

    /// 403.
    #[error("access denied")]
    Forbidden(Reply),

    /// 404.
    #[error("requested resource does not exist")]
    NotFound(Reply),

    /// 500.
    #[error("server error")]
    ServerError(Reply),

    /// Any other non-success status.
    #[error("request failed with status {0}")]
    OtherStatus(u16, Reply),

    /// The request went out but nothing came back: timeout, refused
    /// connection, reset mid-read.
    #[error("no response from server: {0}")]
    NoResponse(#[source] BoxError),

    /// The request could not be built or sent at all.
    #[error("request setup failed: {0}")]
    SetupError(#[source] BoxError),
}

impl ClassifiedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_)      => ErrorKind::Unauthorized,
            Self::Forbidden(_)         => ErrorKind::Forbidden,
            Self::NotFound(_)          => ErrorKind::NotFound,
            Self::ServerError(_)       => ErrorKind::ServerError,
            Self::OtherStatus(code, _) => ErrorKind::OtherStatus(*code),
            Self::NoResponse(_)        => ErrorKind::NoResponse,
            Self::SetupError(_)        => ErrorKind::SetupError,
        }
    }

    /// The server's reply, for the status-derived variants.
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Unauthorized(r)
            | Self::Forbidden(r)
            | Self::NotFound(r)
            | Self::ServerError(r)
            | Self::OtherStatus(_, r) => Some(r),
            Self::NoResponse(_) | Self::SetupError(_) => None,
        }
    }

    /// The HTTP status, when a reply was received.
    pub fn status(&self) -> Option<u16> {
        self.reply().map(Reply::status)
    }

    /// Shorthand for custom outbound stages that reject a request.
    pub fn setup(e: impl Into<BoxError>) -> Self {
        Self::SetupError(e.into())
    }

    pub fn no_response(e: impl Into<BoxError>) -> Self {
        Self::NoResponse(e.into())
    }
}

/// Payload-free discriminant of [`ClassifiedError`], handy for matching and
/// assertions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    OtherStatus(u16),
    NoResponse,
    SetupError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized      => f.write_str("unauthorized"),
            Self::Forbidden         => f.write_str("forbidden"),
            Self::NotFound          => f.write_str("not found"),
            Self::ServerError       => f.write_str("server error"),
            Self::OtherStatus(code) => write!(f, "status {code}"),
            Self::NoResponse        => f.write_str("no response"),
            Self::SetupError        => f.write_str("setup error"),
        }
    }
}

// ── Error ─────────────────────────────────────────────────────────────────────

/// Client-side infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no route matches `{0}`")]
    RouteNotFound(String),

    #[error("no route is named `{0}`")]
    UnknownRouteName(String),

    #[error("redirect loop while navigating to `{0}`")]
    RedirectLoop(String),

    #[error("session io: {0}")]
    SessionIo(#[from] std::io::Error),

    #[error("session file is corrupt: {0}")]
    SessionFormat(#[from] serde_json::Error),
}
