//! Replacement order port towards the production-order subsystem.

use crate::assembly::domain::{IssueId, JobId, ReplacementOrderId, RoleId, SupplierId, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for replacement order requests.
pub type ReplacementOrderResult<T> = Result<T, ReplacementOrderError>;

/// Line item of a replacement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementLineItem {
    /// Item to produce again.
    pub name: String,
    /// Quantity to produce.
    pub quantity: u32,
    /// Unit of measure.
    pub unit: String,
    /// Free-text notes.
    pub notes: String,
    /// Always `true`; marks the item as a replacement.
    pub is_replacement: bool,
    /// Issue that triggered the replacement.
    pub original_issue_id: IssueId,
}

/// Request to create a production order replacing a defective item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOrderRequest {
    /// Job the replacement belongs to.
    pub job_id: JobId,
    /// Order title shown to production.
    pub job_title: String,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Trade the item belongs to.
    pub role_id: RoleId,
    /// Trade display name.
    pub role_name: String,
    /// Production order type.
    pub order_type: String,
    /// Supplier hint.
    pub supplier_id: Option<SupplierId>,
    /// Items to produce.
    pub items: Vec<ReplacementLineItem>,
    /// Order notes.
    pub notes: String,
    /// Task the issue was reported on.
    pub task_id: TaskId,
}

/// Production-order subsystem accepting replacement requests.
#[async_trait]
pub trait ReplacementOrderSink: Send + Sync {
    /// Creates a production order and returns its identifier.
    async fn create_replacement_order(
        &self,
        request: &ReplacementOrderRequest,
    ) -> ReplacementOrderResult<ReplacementOrderId>;
}

/// Errors returned by replacement order sinks.
#[derive(Debug, Clone, Error)]
pub enum ReplacementOrderError {
    /// The production subsystem refused the request.
    #[error("replacement order rejected: {0}")]
    Rejected(String),

    /// The production subsystem could not be reached.
    #[error("replacement order sink unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl ReplacementOrderError {
    /// Wraps a transport or backend error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
