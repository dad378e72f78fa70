//! User administration endpoints, including CSV/XLSX bulk import.

use std::path::Path;

use tracing::info;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::models::{ImportReport, ListParams, NewUser, Page, UpdateUser, User};

/// User administration operations.
#[derive(Debug)]
pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List users. Admin only.
    pub async fn list(&self, params: &ListParams) -> Result<Page<User>> {
        self.client.get_with_query("/users", params).await
    }

    /// Fetch one user.
    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&format!("/users/{id}")).await
    }

    /// Create a user. Admin only.
    pub async fn create(&self, user: &NewUser) -> Result<User> {
        self.client.post("/users", user).await
    }

    /// Partially update a user. Admin only.
    pub async fn update(&self, id: &str, patch: &UpdateUser) -> Result<User> {
        self.client.patch(&format!("/users/{id}"), patch).await
    }

    /// Deactivate a user. Resolves to `Ok(())` on the server's 204.
    pub async fn deactivate(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/users/{id}")).await
    }

    /// Bulk-import users from a CSV or XLSX file. Admin only.
    ///
    /// The format is detected from the file extension; the server does the
    /// actual parsing and returns a per-row report.
    pub async fn import(&self, path: &Path) -> Result<ImportReport> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ApiError::InvalidConfig(format!("import path has no file name: {}", path.display()))
            })?
            .to_string();

        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => "text/csv",
            Some("xlsx") => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            other => {
                return Err(ApiError::InvalidConfig(format!(
                    "unsupported import format '{}' (expected .csv or .xlsx)",
                    other.unwrap_or("")
                )));
            }
        };

        let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(file = %path.display(), size = bytes.len(), "uploading user import");
        self.client
            .upload("/users/import", "file", file_name, mime.to_string(), bytes)
            .await
    }
}
