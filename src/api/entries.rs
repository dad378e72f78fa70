//! Time entry endpoints, including bulk-fill and week-copy.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{BulkFill, CopyWeek, NewTimeEntry, TimeEntry, UpdateTimeEntry};

/// Time entry operations, scoped to a timesheet.
#[derive(Debug)]
pub struct EntriesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EntriesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List the entries of a timesheet.
    pub async fn list(&self, timesheet_id: &str) -> Result<Vec<TimeEntry>> {
        self.client
            .get(&format!("/timesheets/{timesheet_id}/entries"))
            .await
    }

    /// Add an entry to a draft timesheet.
    pub async fn create(&self, timesheet_id: &str, entry: &NewTimeEntry) -> Result<TimeEntry> {
        self.client
            .post(&format!("/timesheets/{timesheet_id}/entries"), entry)
            .await
    }

    /// Update hours or note on an entry.
    pub async fn update(&self, entry_id: &str, patch: &UpdateTimeEntry) -> Result<TimeEntry> {
        self.client
            .patch(&format!("/entries/{entry_id}"), patch)
            .await
    }

    /// Delete an entry. Resolves to `Ok(())` on the server's 204.
    pub async fn delete(&self, entry_id: &str) -> Result<()> {
        self.client.delete(&format!("/entries/{entry_id}")).await
    }

    /// Fill the same project/task/hours across several days at once.
    pub async fn bulk_fill(&self, timesheet_id: &str, fill: &BulkFill) -> Result<Vec<TimeEntry>> {
        self.client
            .post(&format!("/timesheets/{timesheet_id}/entries/bulk"), fill)
            .await
    }

    /// Copy the entries of another week into this timesheet.
    pub async fn copy_week(&self, timesheet_id: &str, copy: &CopyWeek) -> Result<Vec<TimeEntry>> {
        self.client
            .post(&format!("/timesheets/{timesheet_id}/entries/copy"), copy)
            .await
    }
}
