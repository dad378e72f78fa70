//! Leave requests and benefit balances.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting manager review.
    Pending,
    /// Granted; balance has been consumed.
    Approved,
    /// Declined by a manager.
    Rejected,
    /// Withdrawn by the requester before review.
    Cancelled,
}

/// A request to consume benefit balance over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Opaque request id.
    pub id: String,
    /// Requesting user.
    pub user_id: String,
    /// Benefit category being consumed.
    pub benefit_type_id: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Working days the server counted for this range.
    pub days: f64,
    /// Lifecycle status.
    pub status: LeaveStatus,
    /// Reason shown to the approving manager.
    #[serde(default)]
    pub reason: Option<String>,
    /// Manager comment from approval or rejection.
    #[serde(default)]
    pub review_comment: Option<String>,
    /// When the request was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for creating a leave request.
#[derive(Debug, Clone, Serialize)]
pub struct NewLeaveRequest {
    /// Benefit category to consume.
    pub benefit_type_id: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,
    /// Reason shown to the approving manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A category of paid leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitType {
    /// Opaque benefit type id.
    pub id: String,
    /// Display name, e.g. "Vacation" or "Sick leave".
    pub name: String,
    /// Days granted per year, if the policy is a fixed annual grant.
    #[serde(default)]
    pub annual_days: Option<f64>,
}

/// Per-user remaining amount for one benefit type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitBalance {
    /// Benefit category.
    pub benefit_type_id: String,
    /// Display name of the category.
    pub benefit_name: String,
    /// Days remaining.
    pub remaining_days: f64,
    /// Days already consumed this period.
    pub used_days: f64,
}
