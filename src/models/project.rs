//! Projects and their billable tasks.

use serde::{Deserialize, Serialize};

/// A project hours can be logged against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Opaque project id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Client-facing project code, e.g. "ACME-01".
    #[serde(default)]
    pub code: Option<String>,
    /// Whether new entries may target this project.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// A task within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Opaque task id.
    pub id: String,
    /// Project this task belongs to.
    pub project_id: String,
    /// Display name.
    pub name: String,
    /// Whether the task is billable to the client.
    #[serde(default)]
    pub billable: bool,
}

fn default_active() -> bool {
    true
}
