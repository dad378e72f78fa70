//! Users, roles, authentication payloads, and bulk-import results.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Access role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Logs hours and requests leave.
    Employee,
    /// Additionally approves team timesheets and leave.
    Manager,
    /// Additionally administers users and projects.
    Admin,
}

/// An account in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user id.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Access role.
    pub role: Role,
    /// Manager this user reports to, if any.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Whether the account can log in.
    #[serde(default = "default_active")]
    pub active: bool,
    /// First day of employment.
    #[serde(default)]
    pub hired_on: Option<NaiveDate>,
}

fn default_active() -> bool {
    true
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Token payload returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token for minting the next access token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Body for creating a user.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Access role.
    pub role: Role,
    /// Manager id, if assigned at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    /// First day of employment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hired_on: Option<NaiveDate>,
}

/// Partial update of a user; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUser {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// New manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
}

/// Outcome of a CSV/XLSX bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows imported as new users.
    pub created: u32,
    /// Rows matched to existing users and updated.
    pub updated: u32,
    /// Rows the server rejected.
    #[serde(default)]
    pub errors: Vec<ImportRowError>,
    /// When the import finished.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A rejected row in a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 1-based row number in the uploaded file.
    pub row: u32,
    /// Why the row was rejected.
    pub message: String,
}
