//! Event log store abstraction.

use crate::visit::VisitRecord;

/// Append-only visit log. Rows are never updated or removed.
#[async_trait::async_trait]
pub trait VisitLogStore: Send + Sync + 'static {
    async fn append_visit(&self, record: &VisitRecord) -> anyhow::Result<()>;

    /// `true` if any row carries `visitor_id`.
    async fn visitor_exists(&self, visitor_id: &str) -> anyhow::Result<bool>;

    /// Every row, in append order.
    async fn read_all_visits(&self) -> anyhow::Result<Vec<VisitRecord>>;

    /// Number of rows logged so far.
    async fn count_visits(&self) -> anyhow::Result<u64>;
}
