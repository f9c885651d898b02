//! Credential injection.

use std::sync::Arc;

use crate::error::ClassifiedError;
use crate::middleware::Outbound;
use crate::request::Request;
use crate::session::{Session, SessionStore};

/// Attaches `Authorization: Bearer <token>` when the session holds a token.
/// Without one the request goes out exactly as built.
pub struct BearerAuth {
    session: Arc<dyn SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self { session }
    }
}

impl Outbound for BearerAuth {
    fn on_request(&self, mut req: Request) -> Result<Request, ClassifiedError> {
        if let Some(token) = Session::read(self.session.as_ref()).token {
            req.set_header("Authorization", &format!("Bearer {token}"));
        }
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySession, TOKEN_KEY};

    #[test]
    fn attaches_bearer_token() {
        let stage = BearerAuth::new(Arc::new(MemorySession::with([(TOKEN_KEY, "abc")])));
        let req = stage.on_request(Request::get("/api/orders")).unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn replaces_a_stale_authorization_header() {
        let stage = BearerAuth::new(Arc::new(MemorySession::with([(TOKEN_KEY, "fresh")])));
        let mut req = Request::get("/api/orders");
        req.set_header("authorization", "Bearer stale");
        let req = stage.on_request(req).unwrap();
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("Authorization"), Some("Bearer fresh"));
    }

    #[test]
    fn leaves_request_alone_without_token() {
        for store in [MemorySession::new(), MemorySession::with([(TOKEN_KEY, "")])] {
            let stage = BearerAuth::new(Arc::new(store));
            let req = stage.on_request(Request::get("/api/products")).unwrap();
            assert!(req.headers().is_empty());
        }
    }
}
