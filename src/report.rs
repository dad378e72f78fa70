//! External error-reporting sink.
//!
//! Server errors and response schema drift are forwarded to an
//! [`ErrorReporter`] in addition to being surfaced or logged. The default
//! implementation emits structured tracing events; deployments wire in
//! their exception tracker behind the same trait.

use std::fmt::Debug;

use tracing::{error, warn};

/// Sink for conditions worth surfacing outside the normal error path.
pub trait ErrorReporter: Send + Sync + Debug {
    /// A 5xx or network-level failure that exhausted its retry budget.
    fn report_server_error(&self, operation: &str, status: Option<u16>, detail: &str);

    /// A response decoded fine but carried fields the client does not know.
    /// The call still succeeds; this is drift between client and contract.
    fn report_schema_drift(&self, operation: &str, unknown_fields: &[String]);
}

/// Default reporter backed by tracing.
#[derive(Debug, Default, Clone)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report_server_error(&self, operation: &str, status: Option<u16>, detail: &str) {
        error!(operation, status, detail, "server error reported");
    }

    fn report_schema_drift(&self, operation: &str, unknown_fields: &[String]) {
        warn!(
            operation,
            fields = ?unknown_fields,
            "response schema drift detected"
        );
    }
}
