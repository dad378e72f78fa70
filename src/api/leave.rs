//! Leave request and benefit balance endpoints.

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{BenefitBalance, LeaveRequest, ListParams, NewLeaveRequest, Page};

/// Leave operations.
#[derive(Debug)]
pub struct LeaveApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LeaveApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List leave requests visible to the caller.
    pub async fn list(&self, params: &ListParams) -> Result<Page<LeaveRequest>> {
        self.client.get_with_query("/leave-requests", params).await
    }

    /// Fetch one leave request.
    pub async fn get(&self, id: &str) -> Result<LeaveRequest> {
        self.client.get(&format!("/leave-requests/{id}")).await
    }

    /// Request leave against a benefit balance.
    pub async fn create(&self, request: &NewLeaveRequest) -> Result<LeaveRequest> {
        self.client.post("/leave-requests", request).await
    }

    /// Withdraw a pending request. Resolves to `Ok(())` on the server's 204.
    pub async fn cancel(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/leave-requests/{id}")).await
    }

    /// Approve a pending request, consuming balance. Manager only.
    pub async fn approve(&self, id: &str, comment: Option<&str>) -> Result<LeaveRequest> {
        self.client
            .post(
                &format!("/leave-requests/{id}/approve"),
                &serde_json::json!({ "comment": comment }),
            )
            .await
    }

    /// Reject a pending request. Manager only.
    pub async fn reject(&self, id: &str, comment: &str) -> Result<LeaveRequest> {
        self.client
            .post(
                &format!("/leave-requests/{id}/reject"),
                &serde_json::json!({ "comment": comment }),
            )
            .await
    }

    /// Remaining benefit balances of the caller.
    pub async fn balances(&self) -> Result<Vec<BenefitBalance>> {
        self.client.get("/benefit-balances").await
    }

    /// Remaining benefit balances of another user. Manager/admin only.
    pub async fn balances_for(&self, user_id: &str) -> Result<Vec<BenefitBalance>> {
        self.client
            .get(&format!("/users/{user_id}/benefit-balances"))
            .await
    }
}
