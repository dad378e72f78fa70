//! HTTP client implementing the authenticated request lifecycle.
//!
//! Every call goes through the same progression: attach the bearer token,
//! send, and then
//! - on 401, refresh the session exactly once across all concurrent
//!   requests and replay the original request a single time;
//! - on 429, surface a terminal rate-limit error with the server's wait
//!   hint;
//! - on 5xx or a network failure, retry with exponential backoff -- but
//!   only for GET, since nothing else is idempotent here;
//! - on success, decode the JSON body, optionally checking it for schema
//!   drift in the development-only validation mode.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::api;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::ErrorBody;
use crate::report::{ErrorReporter, LogReporter};
use crate::schema::unknown_fields;
use crate::session::{SessionStore, TokenSet};

/// Wait hint used when a 429 arrives without a parseable `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Longest error body fragment carried into error messages and logs.
const ERROR_BODY_LIMIT: usize = 500;

/// Request body shapes the client knows how to rebuild for a replay.
///
/// Requests may be sent more than once (retry, replay after refresh), so
/// the payload is kept in a rebuildable form rather than a consumed
/// `RequestBuilder`.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    /// No body.
    Empty,
    /// JSON body.
    Json(Value),
    /// Multipart file upload.
    File {
        /// Form field name.
        field: &'static str,
        /// File name sent to the server, drives import format detection.
        file_name: String,
        /// MIME type of the upload.
        mime: String,
        /// File contents.
        bytes: Vec<u8>,
    },
}

/// Authenticated API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<Config>,
    session: SessionStore,
    reporter: Arc<dyn ErrorReporter>,
}

impl ApiClient {
    /// Create a new client over the given session store.
    pub fn new(config: Arc<Config>, session: SessionStore) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .timeout(config.request.timeout)
            .tcp_nodelay(true)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            config,
            session,
            reporter: Arc::new(LogReporter),
        })
    }

    /// Replace the error-reporting sink.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The session store this client authenticates through.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // Endpoint service accessors.

    /// Authentication endpoints (login, logout, refresh, me).
    pub fn auth(&self) -> api::AuthApi<'_> {
        api::AuthApi::new(self)
    }

    /// Timesheet endpoints.
    pub fn timesheets(&self) -> api::TimesheetsApi<'_> {
        api::TimesheetsApi::new(self)
    }

    /// Time entry endpoints.
    pub fn entries(&self) -> api::EntriesApi<'_> {
        api::EntriesApi::new(self)
    }

    /// Leave request and benefit balance endpoints.
    pub fn leave(&self) -> api::LeaveApi<'_> {
        api::LeaveApi::new(self)
    }

    /// Project and task endpoints.
    pub fn projects(&self) -> api::ProjectsApi<'_> {
        api::ProjectsApi::new(self)
    }

    /// Holiday and team calendar endpoints.
    pub fn calendar(&self) -> api::CalendarApi<'_> {
        api::CalendarApi::new(self)
    }

    /// User administration endpoints.
    pub fn users(&self) -> api::UsersApi<'_> {
        api::UsersApi::new(self)
    }

    // Typed request helpers used by the endpoint services.

    pub(crate) async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
    {
        self.request(Method::GET, path, Vec::new(), Payload::Empty)
            .await
    }

    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
        Q: Serialize,
    {
        let pairs = query_pairs(query)?;
        self.request(Method::GET, path, pairs, Payload::Empty).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned + Serialize,
    {
        let json = to_json(body)?;
        self.request(Method::POST, path, Vec::new(), Payload::Json(json))
            .await
    }

    /// POST with no request body (state transitions such as submit).
    pub(crate) async fn post_empty<T>(&self, path: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
    {
        self.request(Method::POST, path, Vec::new(), Payload::Empty)
            .await
    }

    /// POST where the response carries no useful body (204 or ignored).
    pub(crate) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize,
    {
        let json = to_json(body)?;
        self.execute(Method::POST, path, Vec::new(), Payload::Json(json))
            .await
            .map(|_| ())
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize,
        T: serde::de::DeserializeOwned + Serialize,
    {
        let json = to_json(body)?;
        self.request(Method::PATCH, path, Vec::new(), Payload::Json(json))
            .await
    }

    /// DELETE; a 204 resolves to `Ok(())`.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, Vec::new(), Payload::Empty)
            .await
            .map(|_| ())
    }

    /// Multipart file upload (never auto-retried; replay-on-401 still applies).
    pub(crate) async fn upload<T>(
        &self,
        path: &str,
        field: &'static str,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
    {
        self.request(
            Method::POST,
            path,
            Vec::new(),
            Payload::File {
                field,
                file_name,
                mime,
                bytes,
            },
        )
        .await
    }

    /// Send and decode a JSON response.
    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        payload: Payload,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
    {
        let operation = format!("{method} {path}");
        let bytes = self.execute(method, path, query, payload).await?;
        self.decode(&operation, &bytes)
    }

    /// Run the full request lifecycle and return the raw success body.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        payload: Payload,
    ) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.config.api_root(), path);
        let idempotent = method == Method::GET;
        let max_attempts = if idempotent {
            self.config.retry.max_attempts
        } else {
            1
        };

        let mut attempt = 0;
        let mut replayed = false;

        loop {
            attempt += 1;

            let observed_epoch = self.session.epoch();
            let token = self.session.access_token().await;
            let request = self.build(&method, &url, &query, &payload, token.as_deref())?;

            trace!(%method, %url, attempt, "sending request");

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if idempotent && attempt < max_attempts {
                        let backoff = self.backoff(attempt);
                        debug!(
                            %method, %url, attempt,
                            backoff_ms = backoff.as_millis(),
                            error = %e,
                            "network failure, retrying"
                        );
                        sleep(backoff).await;
                        continue;
                    }
                    self.reporter
                        .report_server_error(&format!("{method} {path}"), None, &e.to_string());
                    return Err(ApiError::Network(e));
                }
            };

            let status = response.status();
            trace!(%method, %url, %status, "received response");

            if status.is_success() {
                if status == StatusCode::NO_CONTENT {
                    return Ok(Vec::new());
                }
                let bytes = response.bytes().await.map_err(ApiError::Network)?;
                return Ok(bytes.to_vec());
            }

            match status {
                StatusCode::UNAUTHORIZED => {
                    if token.is_none() {
                        // Unauthenticated call rejected (e.g. bad login):
                        // nothing to refresh, surface the payload.
                        return Err(self.error_from_response(status, response).await);
                    }
                    if replayed {
                        // The refreshed token was rejected too. Give up.
                        warn!(%method, %url, "replayed request rejected, session expired");
                        self.session.clear().await.ok();
                        return Err(ApiError::SessionExpired);
                    }

                    debug!(%method, %url, "401 received, refreshing session");
                    self.session
                        .refresh_once(observed_epoch, |refresh_token| {
                            self.refresh_call(refresh_token)
                        })
                        .await?;

                    // Replay once with the new token, without consuming
                    // the retry budget.
                    replayed = true;
                    attempt -= 1;
                    continue;
                }
                StatusCode::FORBIDDEN => {
                    let body = self.read_error_body(response).await;
                    return Err(ApiError::Forbidden {
                        message: body
                            .message
                            .unwrap_or_else(|| "insufficient permissions".to_string()),
                    });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = parse_retry_after(&response);
                    return Err(ApiError::RateLimited { retry_after });
                }
                _ if status.is_server_error() => {
                    if idempotent && attempt < max_attempts {
                        let backoff = self.backoff(attempt);
                        debug!(
                            %method, %url, attempt, %status,
                            backoff_ms = backoff.as_millis(),
                            "server error, retrying"
                        );
                        sleep(backoff).await;
                        continue;
                    }
                    let body = truncate(&response.text().await.unwrap_or_default());
                    self.reporter.report_server_error(
                        &format!("{method} {path}"),
                        Some(status.as_u16()),
                        &body,
                    );
                    return Err(ApiError::Server {
                        status: status.as_u16(),
                        body,
                    });
                }
                _ => {
                    return Err(self.error_from_response(status, response).await);
                }
            }
        }
    }

    /// Build a fresh request for one attempt.
    fn build(
        &self,
        method: &Method,
        url: &str,
        query: &[(String, String)],
        payload: &Payload,
        token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder> {
        let mut request = self.http.request(method.clone(), url);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(json) => request.json(json),
            Payload::File {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::InvalidConfig(format!("bad MIME type: {e}")))?;
                request.multipart(reqwest::multipart::Form::new().part(field.to_string(), part))
            }
        };

        Ok(request)
    }

    /// Decode a success body, checking for schema drift in validation mode.
    fn decode<T>(&self, operation: &str, bytes: &[u8]) -> Result<T>
    where
        T: serde::de::DeserializeOwned + Serialize,
    {
        if !self.config.validate_responses {
            return serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
                context: operation.to_string(),
                source: e,
            });
        }

        let raw: Value = serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
            context: operation.to_string(),
            source: e,
        })?;
        let value: T = serde_json::from_value(raw.clone()).map_err(|e| ApiError::Decode {
            context: operation.to_string(),
            source: e,
        })?;

        // Drift is reported, never fatal: the decoded value is fine.
        if let Ok(known) = serde_json::to_value(&value) {
            let drift = unknown_fields(&raw, &known);
            if !drift.is_empty() {
                self.reporter.report_schema_drift(operation, &drift);
            }
        }

        Ok(value)
    }

    /// The refresh call itself: plain POST, no auth, no replay.
    pub(crate) async fn refresh_call(&self, refresh_token: String) -> Result<TokenSet> {
        let url = format!("{}/auth/refresh", self.config.api_root());
        let body = serde_json::json!({ "refresh_token": refresh_token });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "refresh call rejected");
            return Err(ApiError::Unauthorized);
        }

        let tokens: crate::models::TokenResponse =
            response.json().await.map_err(ApiError::Network)?;
        Ok(TokenSet::new(
            tokens.access_token,
            tokens.refresh_token,
            tokens.expires_in,
        ))
    }

    /// Map a non-retryable error response into `ApiError::Api`.
    async fn error_from_response(&self, status: StatusCode, response: reqwest::Response) -> ApiError {
        let body = self.read_error_body(response).await;
        ApiError::Api {
            status: status.as_u16(),
            code: body.code.unwrap_or_else(|| "unknown".to_string()),
            message: body
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            request_id: body.request_id,
        }
    }

    /// Parse the backend error payload, degrading to the raw text.
    async fn read_error_body(&self, response: reqwest::Response) -> ErrorBody {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str(&text).unwrap_or(ErrorBody {
            code: None,
            message: if text.is_empty() {
                None
            } else {
                Some(truncate(&text))
            },
            request_id: None,
        })
    }

    /// Backoff before retry number `attempt` (1-based), with jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry.initial_backoff.as_millis() as f64;
        let multiplier = self.config.retry.multiplier.powi(attempt as i32 - 1);
        let backoff_ms = base * multiplier;

        // ±25% jitter keeps simultaneous failures from retrying in lockstep.
        let jitter = 1.0 + (rand::random::<f64>() - 0.5) * 0.5;
        let final_ms = (backoff_ms * jitter) as u64;

        Duration::from_millis(final_ms.min(self.config.retry.max_backoff.as_millis() as u64))
    }
}

/// Serialize a body, mapping failures into the decode error context.
fn to_json<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        context: "request body".to_string(),
        source: e,
    })
}

/// Flatten a serializable query struct into string pairs.
///
/// Only flat structs of scalars/options are used as queries here; nested
/// values would be a programming error and are rejected.
fn query_pairs<Q: Serialize>(query: &Q) -> Result<Vec<(String, String)>> {
    let value = to_json(query)?;
    let map = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ApiError::InvalidConfig(
                "query parameters must serialize to an object".to_string(),
            ));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let rendered = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ApiError::InvalidConfig(format!(
                    "query parameter '{key}' is not a scalar: {other}"
                )));
            }
        };
        pairs.push((key, rendered));
    }
    Ok(pairs)
}

/// Parse `Retry-After` in its seconds form.
fn parse_retry_after(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn truncate(body: &str) -> String {
    if body.len() > ERROR_BODY_LIMIT {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
