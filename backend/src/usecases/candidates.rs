use crates::domain::{
    repositories::candidates::CandidateRepository,
    value_objects::candidates::InsertCandidateModel,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AddCandidateError {
    #[error("Firstname and Lastname are required")]
    MissingNames,

    #[error("Failed to add candidate")]
    Store(#[source] anyhow::Error),
}

/// Name-only candidate creation used by `/addcandidate`.
pub struct CandidatesUseCase<C>
where
    C: CandidateRepository + Send + Sync + 'static,
{
    candidate_repository: Arc<C>,
}

impl<C> CandidatesUseCase<C>
where
    C: CandidateRepository + Send + Sync + 'static,
{
    pub fn new(candidate_repository: Arc<C>) -> Self {
        Self {
            candidate_repository,
        }
    }

    pub async fn add_candidate(
        &self,
        firstname: Option<String>,
        lastname: Option<String>,
    ) -> Result<Uuid, AddCandidateError> {
        let (Some(first_name), Some(last_name)) = (non_blank(firstname), non_blank(lastname))
        else {
            return Err(AddCandidateError::MissingNames);
        };

        let candidate_id = self
            .candidate_repository
            .insert(InsertCandidateModel {
                first_name: Some(first_name),
                last_name: Some(last_name),
                ..Default::default()
            })
            .await
            .map_err(AddCandidateError::Store)?;

        info!(%candidate_id, "candidates: name-only candidate added");
        Ok(candidate_id)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
