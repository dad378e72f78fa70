//! # Tally API
//!
//! Typed async client for the Tally HR/timesheet REST API.
//!
//! The client wraps the `/api/v1` contract (authentication, timesheets,
//! time entries, leave requests, benefit balances, projects, holidays,
//! calendar feeds, and user administration) behind typed endpoint
//! services, and implements the full authenticated request lifecycle:
//!
//! - **Bearer auth with transparent refresh**: a 401 triggers a single
//!   token refresh shared across all concurrent requests, then replays
//!   the original request exactly once.
//! - **Retry with backoff for idempotent requests**: GETs that hit 5xx or
//!   network failures are retried with exponential backoff (1s, 2s, 4s by
//!   default); nothing else is ever auto-retried.
//! - **Normalized errors**: every failure becomes an [`ApiError`] carrying
//!   status, machine code, message, and correlation id.
//! - **Schema drift detection**: in the development-only validation mode,
//!   responses carrying fields the client does not know are reported to an
//!   error sink without failing the call.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally_api::{ApiClient, Config, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::new("https://tally.example.com"));
//!     let client = ApiClient::new(config, SessionStore::in_memory())?;
//!
//!     client.auth().login("ada@example.com", "hunter2").await?;
//!
//!     let me = client.auth().me().await?;
//!     let sheet = client
//!         .timesheets()
//!         .current(chrono::NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
//!         .await?;
//!     println!("{}: {} hours logged", me.name, sheet.total_hours);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The client is configured via [`Config`] (JSON file, environment
//! variables prefixed with `TALLY_`, or CLI flags of the `tally` binary).
//! Retry constants are tuning defaults, not contracts; see
//! [`config::RetryConfig`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod schema;
pub mod session;

// Re-exports for convenience
pub use client::ApiClient;
pub use config::{Args, Command, Config, RequestConfig, RetryConfig};
pub use error::{ApiError, Result};
pub use report::{ErrorReporter, LogReporter};
pub use session::{SessionStore, TokenSet};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
