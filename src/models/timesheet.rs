//! Timesheets and the time entries that make them up.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a weekly timesheet.
///
/// Draft timesheets accumulate entries; submitting moves them to pending,
/// and a manager resolves pending into approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    /// Being edited by its owner.
    Draft,
    /// Submitted, awaiting manager review.
    Pending,
    /// Accepted by a manager.
    Approved,
    /// Sent back by a manager; editable again.
    Rejected,
}

/// A weekly aggregate of time entries for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timesheet {
    /// Opaque timesheet id.
    pub id: String,
    /// Owner of the timesheet.
    pub user_id: String,
    /// Monday of the covered week.
    pub week_start: NaiveDate,
    /// Lifecycle status.
    pub status: TimesheetStatus,
    /// Sum of entry hours, as computed by the server.
    pub total_hours: f64,
    /// Entries, present on detail responses.
    #[serde(default)]
    pub entries: Vec<TimeEntry>,
    /// Manager comment from approval or rejection.
    #[serde(default)]
    pub review_comment: Option<String>,
    /// When the timesheet was last submitted.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Timesheet {
    /// Sum of the hours of the entries carried on this response.
    ///
    /// On list responses entries are omitted and this is 0; prefer
    /// `total_hours` which the server always fills.
    pub fn entry_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours).sum()
    }
}

/// A single (project, task, day, hours) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Opaque entry id.
    pub id: String,
    /// Timesheet this entry belongs to.
    pub timesheet_id: String,
    /// Project the hours are billed against.
    pub project_id: String,
    /// Task within the project.
    pub task_id: String,
    /// Day the hours were worked.
    pub date: NaiveDate,
    /// Number of hours.
    pub hours: f64,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Body for creating a time entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewTimeEntry {
    /// Project the hours are billed against.
    pub project_id: String,
    /// Task within the project.
    pub task_id: String,
    /// Day the hours were worked.
    pub date: NaiveDate,
    /// Number of hours.
    pub hours: f64,
    /// Free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Partial update of a time entry; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTimeEntry {
    /// New hour count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    /// New note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body for the bulk-fill operation: the same project/task/hours applied
/// to each listed day of the week.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFill {
    /// Project the hours are billed against.
    pub project_id: String,
    /// Task within the project.
    pub task_id: String,
    /// Days to fill.
    pub dates: Vec<NaiveDate>,
    /// Hours per day.
    pub hours: f64,
}

/// Body for copying the previous week's entries into this timesheet.
#[derive(Debug, Clone, Serialize)]
pub struct CopyWeek {
    /// Week to copy from (Monday).
    pub source_week_start: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hours: f64) -> TimeEntry {
        TimeEntry {
            id: "e1".into(),
            timesheet_id: "t1".into(),
            project_id: "p1".into(),
            task_id: "k1".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            hours,
            note: None,
        }
    }

    #[test]
    fn test_status_wire_format() {
        let status: TimesheetStatus = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(status, TimesheetStatus::Pending);
    }

    #[test]
    fn test_entry_hours_sum() {
        let sheet = Timesheet {
            id: "t1".into(),
            user_id: "u1".into(),
            week_start: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            status: TimesheetStatus::Draft,
            total_hours: 12.5,
            entries: vec![entry(8.0), entry(4.5)],
            review_comment: None,
            submitted_at: None,
        };
        assert_eq!(sheet.entry_hours(), 12.5);
    }

    #[test]
    fn test_list_response_without_entries() {
        let sheet: Timesheet = serde_json::from_str(
            r#"{"id": "t1", "user_id": "u1", "week_start": "2025-06-02",
                "status": "approved", "total_hours": 40.0}"#,
        )
        .unwrap();
        assert!(sheet.entries.is_empty());
        assert_eq!(sheet.status, TimesheetStatus::Approved);
    }
}
