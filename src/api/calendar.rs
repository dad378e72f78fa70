//! Holiday and team calendar endpoints.

use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CalendarEntry, Holiday};

/// Calendar operations.
#[derive(Debug)]
pub struct CalendarApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CalendarApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Company holidays for one year.
    pub async fn holidays(&self, year: i32) -> Result<Vec<Holiday>> {
        self.client
            .get_with_query("/holidays", &serde_json::json!({ "year": year }))
            .await
    }

    /// Team calendar feed over a date range: leave and holidays for the
    /// caller's team. Manager view.
    pub async fn team(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEntry>> {
        self.client
            .get_with_query(
                "/calendar/team",
                &serde_json::json!({ "from": from, "to": to }),
            )
            .await
    }
}
