//! Typed endpoint wrappers over [`ApiClient`](crate::client::ApiClient).
//!
//! Each service is a thin borrow of the client exposing one resource
//! family of the `/api/v1` contract; obtain them via the accessors on
//! `ApiClient` (`client.timesheets()`, `client.leave()`, ...).

mod auth;
mod calendar;
mod entries;
mod leave;
mod projects;
mod timesheets;
mod users;

pub use auth::AuthApi;
pub use calendar::CalendarApi;
pub use entries::EntriesApi;
pub use leave::LeaveApi;
pub use projects::ProjectsApi;
pub use timesheets::{TimesheetFilter, TimesheetsApi};
pub use users::UsersApi;
