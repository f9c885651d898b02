//! Failure diagnostics.

use tracing::{error, warn};

use crate::error::ClassifiedError;
use crate::middleware::Inbound;
use crate::response::Body;

/// Logs one diagnostic per failed call. Successes pass silently; every
/// result is returned unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorReporter;

impl Inbound for ErrorReporter {
    fn on_response(&self, result: Result<Body, ClassifiedError>) -> Result<Body, ClassifiedError> {
        if let Err(ref e) = result {
            report(e);
        }
        result
    }
}

fn report(e: &ClassifiedError) {
    match e {
        ClassifiedError::Unauthorized(_)      => warn!(status = 401, "unauthorized, signing out"),
        ClassifiedError::Forbidden(_)         => error!(status = 403, "access denied"),
        ClassifiedError::NotFound(_)          => error!(status = 404, "requested resource does not exist"),
        ClassifiedError::ServerError(_)       => error!(status = 500, "server error"),
        ClassifiedError::OtherStatus(code, _) => error!(status = *code, "request failed with status {code}"),
        ClassifiedError::NoResponse(cause)    => error!("network error, check the connection: {cause}"),
        ClassifiedError::SetupError(cause)    => error!("request error: {cause}"),
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::response::Reply;

    // --- Event capture ---

    #[derive(Debug)]
    struct Captured {
        level: Level,
        status: Option<u64>,
        message: String,
    }

    #[derive(Default)]
    struct Fields {
        status: Option<u64>,
        message: String,
    }

    impl Visit for Fields {
        fn record_i64(&mut self, field: &Field, value: i64) {
            if field.name() == "status" {
                self.status = u64::try_from(value).ok();
            }
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            if field.name() == "status" {
                self.status = Some(value);
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = format!("{value:?}");
            }
        }
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<Captured>>>);

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            event.record(&mut fields);
            self.0.lock().unwrap().push(Captured {
                level: *event.metadata().level(),
                status: fields.status,
                message: fields.message,
            });
        }
    }

    fn events_of(result: Result<Body, ClassifiedError>) -> Vec<Captured> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, || {
            let _ = ErrorReporter.on_response(result);
        });
        std::mem::take(&mut *capture.0.lock().unwrap())
    }

    fn reply(status: u16) -> Reply {
        Reply::new(status, Vec::new(), Bytes::new())
    }

    // --- Tests ---

    #[test]
    fn success_logs_nothing() {
        assert!(events_of(Ok(Body::from_static(b"fine"))).is_empty());
    }

    #[test]
    fn each_status_failure_logs_once_with_its_status() {
        let cases = [
            (ClassifiedError::Unauthorized(reply(401)),     Level::WARN,  401, "unauthorized"),
            (ClassifiedError::Forbidden(reply(403)),        Level::ERROR, 403, "access denied"),
            (ClassifiedError::NotFound(reply(404)),         Level::ERROR, 404, "does not exist"),
            (ClassifiedError::ServerError(reply(500)),      Level::ERROR, 500, "server error"),
            (ClassifiedError::OtherStatus(409, reply(409)), Level::ERROR, 409, "status 409"),
        ];
        for (failure, level, status, text) in cases {
            let events = events_of(Err(failure));
            assert_eq!(events.len(), 1, "{status}: {events:?}");
            assert_eq!(events[0].level, level, "{status}");
            assert_eq!(events[0].status, Some(status));
            assert!(events[0].message.contains(text), "{status}: {}", events[0].message);
        }
    }

    #[test]
    fn transport_failures_log_once_with_their_cause() {
        let cases = [
            (ClassifiedError::no_response("connection reset"), "network error", "connection reset"),
            (ClassifiedError::setup("bad uri"),                "request error", "bad uri"),
        ];
        for (failure, prefix, cause) in cases {
            let events = events_of(Err(failure));
            assert_eq!(events.len(), 1, "{events:?}");
            assert_eq!(events[0].level, Level::ERROR);
            assert_eq!(events[0].status, None);
            assert!(events[0].message.starts_with(prefix), "{}", events[0].message);
            assert!(events[0].message.contains(cause), "{}", events[0].message);
        }
    }

    #[test]
    fn passes_every_result_through() {
        let ok = ErrorReporter.on_response(Ok(Body::from_static(b"fine")));
        assert_eq!(ok.unwrap().text(), "fine");

        let failures = [
            ClassifiedError::Forbidden(Reply::new(403, Vec::new(), Bytes::new())),
            ClassifiedError::OtherStatus(409, Reply::new(409, Vec::new(), Bytes::new())),
            ClassifiedError::no_response("reset"),
            ClassifiedError::setup("bad uri"),
        ];
        for failure in failures {
            let kind = failure.kind();
            let err = ErrorReporter.on_response(Err(failure)).unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}
