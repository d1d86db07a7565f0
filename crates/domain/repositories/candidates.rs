use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::candidates::InsertCandidateModel;

/// Metadata store for candidate records. Records are insert-only.
#[async_trait]
#[automock]
pub trait CandidateRepository {
    async fn insert(&self, candidate: InsertCandidateModel) -> Result<Uuid>;
}
