//! Configuration for the Tally API client.
//!
//! Supports configuration via CLI arguments, environment variables,
//! and a JSON configuration file with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// CLI arguments for the `tally` binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tally",
    version,
    about = "Typed client for the Tally HR/timesheet API",
    long_about = "Tally is a command-line client for the Tally HR/timesheet API.\n\n\
                  It handles bearer authentication with transparent token refresh,\n\
                  retries idempotent requests with exponential backoff, and exposes\n\
                  timesheets, time entries, leave requests, and user administration."
)]
pub struct Args {
    /// Base URL of the Tally API server
    #[arg(short = 'u', long, env = "TALLY_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Path to a JSON configuration file
    #[arg(short, long, env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the session file holding tokens between invocations
    #[arg(long, env = "TALLY_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30", env = "TALLY_TIMEOUT")]
    pub timeout: u64,

    /// Maximum attempts for idempotent requests (initial try + retries)
    #[arg(short = 'a', long, default_value = "3", env = "TALLY_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Validate response bodies against the expected shape (development aid)
    #[arg(long, env = "TALLY_VALIDATE_RESPONSES")]
    pub validate_responses: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "TALLY_VERBOSE")]
    pub verbose: bool,

    /// Output logs and results as JSON
    #[arg(long, env = "TALLY_JSON")]
    pub json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Subcommands of the `tally` binary.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in with email and password, storing the session locally
    Login {
        /// Account email
        #[arg(long, env = "TALLY_EMAIL")]
        email: String,
        /// Account password (prefer the env var over the flag)
        #[arg(long, env = "TALLY_PASSWORD")]
        password: String,
    },
    /// End the session and clear stored tokens
    Logout,
    /// Show the currently authenticated user
    Whoami,
    /// List timesheets (managers see their team, employees their own)
    Timesheets {
        /// Filter by status (draft, pending, approved, rejected)
        #[arg(long)]
        status: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Show one timesheet with its entries
    Timesheet {
        /// Timesheet id
        id: String,
    },
    /// Submit a draft timesheet for approval
    Submit {
        /// Timesheet id
        id: String,
    },
    /// Log hours against a project task
    Log {
        /// Project id
        #[arg(long)]
        project: String,
        /// Task id
        #[arg(long)]
        task: String,
        /// Day the hours were worked (YYYY-MM-DD)
        #[arg(long)]
        date: chrono::NaiveDate,
        /// Number of hours
        #[arg(long)]
        hours: f64,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },
    /// Fill the same project, task, and hours across several days
    Fill {
        /// Project id
        #[arg(long)]
        project: String,
        /// Task id
        #[arg(long)]
        task: String,
        /// Day to fill, repeatable (YYYY-MM-DD)
        #[arg(long = "date", required = true)]
        dates: Vec<chrono::NaiveDate>,
        /// Hours per day
        #[arg(long)]
        hours: f64,
    },
    /// List leave requests
    Leave,
    /// Request leave against a benefit balance
    RequestLeave {
        /// Benefit type id (vacation, sick, ...)
        #[arg(long)]
        benefit: String,
        /// First day of leave (YYYY-MM-DD)
        #[arg(long)]
        from: chrono::NaiveDate,
        /// Last day of leave (YYYY-MM-DD)
        #[arg(long)]
        to: chrono::NaiveDate,
        /// Reason shown to the approving manager
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show remaining benefit balances
    Balances,
    /// List active projects and their tasks
    Projects,
    /// List company holidays for a year
    Holidays {
        /// Year (defaults to the current year)
        year: Option<i32>,
    },
    /// Bulk-import users from a CSV or XLSX file (admin only)
    ImportUsers {
        /// Path to the import file
        file: PathBuf,
    },
}

/// Full client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API server, without the version prefix.
    pub base_url: String,

    /// API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request settings.
    #[serde(default)]
    pub request: RequestConfig,

    /// Retry settings for idempotent requests.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Validate response bodies against the expected shape, reporting
    /// drift without failing the call. Development aid, off by default.
    #[serde(default)]
    pub validate_responses: bool,
}

fn default_api_version() -> String {
    "v1".to_string()
}

/// Request-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Request timeout.
    #[serde(with = "duration_serde", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Retry configuration for idempotent (GET) requests.
///
/// The defaults match the product tuning: 3 attempts with backoff
/// seeded at 1 second (1s, 2s, 4s). They are deliberately configurable
/// rather than baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (initial try + retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry.
    #[serde(with = "duration_serde", default = "default_initial_backoff")]
    pub initial_backoff: Duration,

    /// Upper bound on any single backoff delay.
    #[serde(with = "duration_serde", default = "default_max_backoff")]
    pub max_backoff: Duration,

    /// Backoff multiplier between attempts.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff() -> Duration {
    Duration::from_secs(1)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(30)
}

fn default_multiplier() -> f64 {
    2.0
}

impl Config {
    /// Build a configuration for the given base URL with defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: default_api_version(),
            request: RequestConfig::default(),
            retry: RetryConfig::default(),
            validate_responses: false,
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ApiError::FileRead {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ApiError::Decode {
            context: format!("config file '{}'", path.display()),
            source: e,
        })
    }

    /// Create configuration from CLI arguments, with the file as the base
    /// and flags overriding it.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config {
            Self::from_file(config_path)?
        } else {
            Self::new(args.base_url.clone())
        };

        config.request.timeout = Duration::from_secs(args.timeout);
        config.retry.max_attempts = args.max_attempts;
        if args.validate_responses {
            config.validate_responses = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::InvalidConfig(
                "base URL cannot be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL must be http(s): '{}'",
                self.base_url
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ApiError::InvalidConfig(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if self.retry.multiplier < 1.0 {
            return Err(ApiError::InvalidConfig(
                "retry multiplier must be at least 1.0".to_string(),
            ));
        }
        Ok(())
    }

    /// Root of the versioned API, e.g. `https://host/api/v1`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Custom serde module for Duration as seconds or "Ns"/"Nms" strings.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(serde::de::Error::custom)
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_defaults_match_product_tuning() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_backoff, Duration::from_secs(1));
        assert_eq!(retry.multiplier, 2.0);
    }

    #[test]
    fn test_api_root() {
        let config = Config::new("https://tally.example.com/");
        assert_eq!(config.api_root(), "https://tally.example.com/api/v1");
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = Config::new("ftp://tally.example.com");
        assert!(matches!(
            config.validate(),
            Err(ApiError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::new("http://localhost:8080");
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fill_subcommand_parses_repeated_dates() {
        let args = Args::try_parse_from([
            "tally", "fill", "--project", "p1", "--task", "k1", "--date", "2025-06-02",
            "--date", "2025-06-03", "--hours", "8",
        ])
        .unwrap();

        match args.command {
            Command::Fill { dates, hours, .. } => {
                assert_eq!(dates.len(), 2);
                assert_eq!(hours, 8.0);
            }
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn test_fill_requires_at_least_one_date() {
        let result = Args::try_parse_from([
            "tally", "fill", "--project", "p1", "--task", "k1", "--hours", "8",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "base_url": "https://api.tally.test",
            "retry": { "max_attempts": 5, "initial_backoff": "250ms" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.api_version, "v1");
    }
}
