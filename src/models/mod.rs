//! Wire-format DTOs mirroring the backend JSON contract.
//!
//! These types carry no behavior beyond (de)serialization and small
//! display helpers; the backend owns their lifecycle and invariants.

mod calendar;
mod common;
mod leave;
mod project;
mod timesheet;
mod user;

pub use calendar::{CalendarEntry, CalendarEntryKind, Holiday};
pub use common::{ErrorBody, ListParams, Page};
pub use leave::{BenefitBalance, BenefitType, LeaveRequest, LeaveStatus, NewLeaveRequest};
pub use project::{Project, Task};
pub use timesheet::{
    BulkFill, CopyWeek, NewTimeEntry, TimeEntry, Timesheet, TimesheetStatus, UpdateTimeEntry,
};
pub use user::{Credentials, ImportReport, ImportRowError, NewUser, Role, TokenResponse, UpdateUser, User};
