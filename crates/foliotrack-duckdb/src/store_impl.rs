use async_trait::async_trait;

use foliotrack_core::{store::VisitLogStore, visit::VisitRecord};

use crate::DuckDbBackend;

#[async_trait]
impl VisitLogStore for DuckDbBackend {
    async fn append_visit(&self, record: &VisitRecord) -> anyhow::Result<()> {
        DuckDbBackend::append_visit(self, record).await
    }

    async fn visitor_exists(&self, visitor_id: &str) -> anyhow::Result<bool> {
        DuckDbBackend::visitor_exists(self, visitor_id).await
    }

    async fn read_all_visits(&self) -> anyhow::Result<Vec<VisitRecord>> {
        DuckDbBackend::read_all_visits(self).await
    }

    async fn count_visits(&self) -> anyhow::Result<u64> {
        DuckDbBackend::count_visits(self).await
    }
}
