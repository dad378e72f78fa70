//! Holidays and the team calendar feed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A company holiday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    /// Day of the holiday.
    pub date: NaiveDate,
    /// Display name, e.g. "New Year's Day".
    pub name: String,
}

/// What a calendar entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEntryKind {
    /// Approved or pending leave.
    Leave,
    /// Company holiday.
    Holiday,
}

/// One entry in the team calendar feed a manager sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    /// User the entry belongs to; absent for company-wide holidays.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name of the user, for rendering without a second fetch.
    #[serde(default)]
    pub user_name: Option<String>,
    /// First day covered.
    pub start_date: NaiveDate,
    /// Last day covered, inclusive.
    pub end_date: NaiveDate,
    /// What the entry represents.
    pub kind: CalendarEntryKind,
    /// Label, e.g. the benefit name or holiday name.
    pub label: String,
}
