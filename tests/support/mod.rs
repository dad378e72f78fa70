//! Shared helpers for the wiremock integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tally_api::report::ErrorReporter;
use tally_api::session::TokenSet;
use tally_api::{ApiClient, Config, SessionStore};

/// Client pointed at a mock server, with millisecond backoffs so retry
/// tests run fast.
pub fn client_for(server_uri: &str) -> ApiClient {
    let mut config = Config::new(server_uri);
    config.retry.initial_backoff = Duration::from_millis(10);
    config.retry.max_backoff = Duration::from_millis(100);
    ApiClient::new(Arc::new(config), SessionStore::in_memory()).expect("client")
}

/// Same as [`client_for`] but with the validation mode on.
#[allow(dead_code)]
pub fn validating_client_for(server_uri: &str) -> ApiClient {
    let mut config = Config::new(server_uri);
    config.retry.initial_backoff = Duration::from_millis(10);
    config.retry.max_backoff = Duration::from_millis(100);
    config.validate_responses = true;
    ApiClient::new(Arc::new(config), SessionStore::in_memory()).expect("client")
}

/// Seed the client's session with a known token pair.
#[allow(dead_code)]
pub async fn authenticate(client: &ApiClient, access: &str, refresh: &str) {
    client
        .session()
        .store(TokenSet::new(access, refresh, None))
        .await
        .expect("store tokens");
}

/// Reporter that records what was reported, for asserting on the sink.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct RecordingReporter {
    /// (operation, status, detail) triples.
    pub server_errors: Mutex<Vec<(String, Option<u16>, String)>>,
    /// (operation, unknown field paths) pairs.
    pub schema_drift: Mutex<Vec<(String, Vec<String>)>>,
}

impl ErrorReporter for RecordingReporter {
    fn report_server_error(&self, operation: &str, status: Option<u16>, detail: &str) {
        self.server_errors
            .lock()
            .unwrap()
            .push((operation.to_string(), status, detail.to_string()));
    }

    fn report_schema_drift(&self, operation: &str, unknown_fields: &[String]) {
        self.schema_drift
            .lock()
            .unwrap()
            .push((operation.to_string(), unknown_fields.to_vec()));
    }
}
