//! Project and task endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Project, Task};

/// Project operations.
#[derive(Debug)]
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List projects the caller can log hours against.
    pub async fn list(&self) -> Result<Vec<Project>> {
        self.client.get("/projects").await
    }

    /// List the tasks of a project.
    pub async fn tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        self.client
            .get(&format!("/projects/{project_id}/tasks"))
            .await
    }
}
