use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use crates::domain::{
    repositories::{
        candidates::CandidateRepository,
        storage::{ObjectStorage, ObjectWriter},
    },
    value_objects::{
        candidates::{InsertCandidateModel, parse_experience},
        enums::{file_slots::FileSlot, scalar_fields::ScalarField},
        storage::{NewStoredFile, StoredFileModel},
    },
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Pull-based source of a file part's bytes.
#[async_trait]
pub trait ChunkSource: Send {
    /// `Ok(None)` once the part is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Unexpected file part `{0}`")]
    UnexpectedFilePart(String),

    #[error("Only one `{0}` file is accepted")]
    DuplicateFilePart(FileSlot),

    #[error("Invalid `{field}`: {reason}")]
    InvalidField { field: ScalarField, reason: String },

    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    #[error("Failed to store `{slot}` file")]
    Storage {
        slot: FileSlot,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to save candidate record")]
    Metadata(#[source] anyhow::Error),
}

impl IngestionError {
    /// Whether the request itself was at fault, as opposed to a store.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IngestionError::Storage { .. } | IngestionError::Metadata(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionOutcome {
    pub candidate_id: Uuid,
    pub resume: Option<StoredFileModel>,
    pub video: Option<StoredFileModel>,
}

pub struct CandidateIngestionUseCase<C, S>
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    candidate_repository: Arc<C>,
    object_storage: Arc<S>,
}

impl<C, S> CandidateIngestionUseCase<C, S>
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    pub fn new(candidate_repository: Arc<C>, object_storage: Arc<S>) -> Self {
        Self {
            candidate_repository,
            object_storage,
        }
    }

    /// Starts ingesting one multipart request.
    pub fn begin(&self) -> Ingestion<'_, C, S> {
        Ingestion {
            usecase: self,
            fields: BTreeMap::new(),
            stored: BTreeMap::new(),
        }
    }

    async fn stream_to_storage(
        &self,
        file: &NewStoredFile,
        source: &mut dyn ChunkSource,
    ) -> Result<StoredFileModel, IngestionError> {
        let slot = file.slot;
        let mut writer = self
            .object_storage
            .open_writer(file)
            .await
            .map_err(|source| IngestionError::Storage { slot, source })?;

        loop {
            let chunk = match source.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(err) => {
                    abort_quietly(writer, file).await;
                    return Err(IngestionError::Malformed(format!("{:#}", err)));
                }
            };

            if chunk.is_empty() {
                continue;
            }

            if let Err(source) = writer.write_chunk(chunk).await {
                abort_quietly(writer, file).await;
                return Err(IngestionError::Storage { slot, source });
            }
        }

        let stored = writer
            .finish()
            .await
            .map_err(|source| IngestionError::Storage { slot, source })?;

        info!(
            slot = %slot,
            filename = %stored.filename,
            size_bytes = stored.size_bytes,
            "candidate file stored"
        );

        Ok(stored)
    }
}

async fn abort_quietly(writer: Box<dyn ObjectWriter>, file: &NewStoredFile) {
    if let Err(err) = writer.abort().await {
        warn!(
            slot = %file.slot,
            filename = %file.filename,
            error = ?err,
            "failed to abort partial object write"
        );
    }
}

/// State of one in-flight submission: scalar fields seen so far and the
/// files already durably written.
pub struct Ingestion<'a, C, S>
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    usecase: &'a CandidateIngestionUseCase<C, S>,
    fields: BTreeMap<ScalarField, String>,
    stored: BTreeMap<FileSlot, StoredFileModel>,
}

impl<C, S> Ingestion<'_, C, S>
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    pub fn accept_field(&mut self, name: &str, value: String) -> Result<(), IngestionError> {
        let Some(field) = ScalarField::from_part_name(name) else {
            debug!(field = %name, "ignoring unknown text field");
            return Ok(());
        };

        if field == ScalarField::Experience {
            parse_experience(&value)
                .map_err(|reason| IngestionError::InvalidField { field, reason })?;
        }

        self.fields.insert(field, value);
        Ok(())
    }

    /// Streams a file part into the bucket and returns only once the object
    /// is durably written.
    pub async fn accept_file(
        &mut self,
        name: &str,
        original_name: Option<String>,
        content_type: Option<String>,
        source: &mut dyn ChunkSource,
    ) -> Result<(), IngestionError> {
        let slot = FileSlot::from_part_name(name)
            .ok_or_else(|| IngestionError::UnexpectedFilePart(name.to_string()))?;

        if self.stored.contains_key(&slot) {
            return Err(IngestionError::DuplicateFilePart(slot));
        }

        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| slot.default_content_type().to_string());

        let file = NewStoredFile {
            filename: Uuid::new_v4().simple().to_string(),
            slot,
            content_type,
            original_name,
        };

        let stored = self.usecase.stream_to_storage(&file, source).await?;
        self.stored.insert(slot, stored);
        Ok(())
    }

    /// Writes the candidate record referencing whatever files were stored.
    pub async fn complete(mut self) -> Result<IngestionOutcome, IngestionError> {
        let resume = self.stored.remove(&FileSlot::Resume);
        let video = self.stored.remove(&FileSlot::Video);

        let candidate = InsertCandidateModel {
            first_name: self.fields.remove(&ScalarField::FirstName),
            last_name: self.fields.remove(&ScalarField::LastName),
            position: self.fields.remove(&ScalarField::Position),
            current_position: self.fields.remove(&ScalarField::CurrentPosition),
            experience: self
                .fields
                .get(&ScalarField::Experience)
                .and_then(|raw| parse_experience(raw).ok().flatten()),
            resume_file_name: resume.as_ref().map(|file| file.filename.clone()),
            video_file_name: video.as_ref().map(|file| file.filename.clone()),
            created_at: None,
        };

        let candidate_id = match self.usecase.candidate_repository.insert(candidate).await {
            Ok(candidate_id) => candidate_id,
            Err(err) => {
                // Objects already in the bucket stay there unreferenced.
                error!(
                    error = ?err,
                    resume_file_name = ?resume.as_ref().map(|file| &file.filename),
                    video_file_name = ?video.as_ref().map(|file| &file.filename),
                    "candidate insert failed after files were stored"
                );
                return Err(IngestionError::Metadata(err));
            }
        };

        info!(
            %candidate_id,
            has_resume = resume.is_some(),
            has_video = video.is_some(),
            "candidate submission ingested"
        );

        Ok(IngestionOutcome {
            candidate_id,
            resume,
            video,
        })
    }
}
