//! Timesheet endpoints: listing, detail, and the status lifecycle.

use chrono::NaiveDate;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Page, Timesheet, TimesheetStatus};

/// Query for listing timesheets.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimesheetFilter {
    /// Restrict to one status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TimesheetStatus>,
    /// Restrict to one user (managers/admins only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Requested page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

/// Timesheet operations.
#[derive(Debug)]
pub struct TimesheetsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> TimesheetsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List timesheets visible to the caller.
    pub async fn list(&self, filter: &TimesheetFilter) -> Result<Page<Timesheet>> {
        self.client.get_with_query("/timesheets", filter).await
    }

    /// Fetch one timesheet with its entries.
    pub async fn get(&self, id: &str) -> Result<Timesheet> {
        self.client.get(&format!("/timesheets/{id}")).await
    }

    /// Fetch (creating if absent) the caller's timesheet for the week
    /// containing `week_start`.
    pub async fn current(&self, week_start: NaiveDate) -> Result<Timesheet> {
        self.client
            .get_with_query(
                "/timesheets/current",
                &serde_json::json!({ "week_start": week_start }),
            )
            .await
    }

    /// Submit a draft timesheet for approval (draft -> pending).
    pub async fn submit(&self, id: &str) -> Result<Timesheet> {
        self.client
            .post_empty(&format!("/timesheets/{id}/submit"))
            .await
    }

    /// Approve a pending timesheet (pending -> approved). Manager only.
    pub async fn approve(&self, id: &str, comment: Option<&str>) -> Result<Timesheet> {
        self.client
            .post(
                &format!("/timesheets/{id}/approve"),
                &serde_json::json!({ "comment": comment }),
            )
            .await
    }

    /// Reject a pending timesheet back to its owner (pending -> rejected).
    pub async fn reject(&self, id: &str, comment: &str) -> Result<Timesheet> {
        self.client
            .post(
                &format!("/timesheets/{id}/reject"),
                &serde_json::json!({ "comment": comment }),
            )
            .await
    }
}
