//! Shared wire types: pagination and the backend error payload.

use serde::{Deserialize, Serialize};

/// One page of a listed collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total items across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size the server applied.
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.per_page) < self.total
    }
}

/// Query parameters common to list endpoints.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListParams {
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Requested page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Free-text filter, where the endpoint supports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ListParams {
    /// Params selecting a specific page with the server's default size.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Correlation id for support tickets.
    #[serde(default)]
    pub request_id: Option<String>,
}
