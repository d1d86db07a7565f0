use crate::{
    axum_http::error_responses::AppError,
    usecases::{
        candidate_ingestion::{
            CandidateIngestionUseCase, ChunkSource, IngestionError, IngestionOutcome,
        },
        candidates::{AddCandidateError, CandidatesUseCase},
    },
};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use bytes::Bytes;
use crates::{
    domain::{
        repositories::{candidates::CandidateRepository, storage::ObjectStorage},
        value_objects::submission_contract::{UPLOAD_SUCCESS_MESSAGE, UploadReceipt},
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::candidates::CandidatePostgres,
        },
        storages::{lazy_bucket::LazyObjectStorage, s3_bucket::S3BucketStorage},
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CANDIDATE_ADDED_MESSAGE: &str = "Candidate added successfully";

#[derive(Debug, Deserialize)]
pub struct AddCandidateRequest {
    firstname: Option<String>,
    lastname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    object_storage: Arc<LazyObjectStorage<S3BucketStorage>>,
) -> Router {
    let candidate_repository = CandidatePostgres::new(Arc::clone(&db_pool));
    router(Arc::new(candidate_repository), object_storage)
}

pub fn router<C, S>(candidate_repository: Arc<C>, object_storage: Arc<S>) -> Router
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    let ingestion_usecase =
        CandidateIngestionUseCase::new(Arc::clone(&candidate_repository), object_storage);
    let candidates_usecase = CandidatesUseCase::new(candidate_repository);

    let uploads = Router::new()
        .route("/upload", post(upload::<C, S>))
        .with_state(Arc::new(ingestion_usecase));

    let candidates = Router::new()
        .route("/addcandidate", post(add_candidate::<C>))
        .with_state(Arc::new(candidates_usecase));

    uploads.merge(candidates)
}

pub async fn upload<C, S>(
    State(usecase): State<Arc<CandidateIngestionUseCase<C, S>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "candidates: upload is not multipart");
            return IngestionError::Malformed(rejection.body_text()).into_response();
        }
    };

    let outcome = match ingest(&usecase, &mut multipart).await {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    let receipt = UploadReceipt {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        resume: outcome.resume.map(|file| file.filename),
        video: outcome.video.map(|file| file.filename),
    };

    (StatusCode::OK, Json(receipt)).into_response()
}

/// Parts are handled in arrival order. A part carrying a filename is a file,
/// everything else is a scalar field. An empty filename is what a browser
/// sends for a file input left blank, so that part counts as absent.
async fn ingest<C, S>(
    usecase: &CandidateIngestionUseCase<C, S>,
    multipart: &mut Multipart,
) -> Result<IngestionOutcome, IngestionError>
where
    C: CandidateRepository + Send + Sync + 'static,
    S: ObjectStorage + Send + Sync + 'static,
{
    let mut ingestion = usecase.begin();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| IngestionError::Malformed(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(original_name) if original_name.is_empty() => {
                debug!(field = %name, "candidates: skipping empty file input");
                let mut chunks = FieldChunks(field);
                while chunks
                    .next_chunk()
                    .await
                    .map_err(|err| IngestionError::Malformed(format!("{:#}", err)))?
                    .is_some()
                {}
            }
            Some(original_name) => {
                let content_type = field.content_type().map(str::to_string);
                let mut chunks = FieldChunks(field);
                ingestion
                    .accept_file(&name, Some(original_name), content_type, &mut chunks)
                    .await?;
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| IngestionError::Malformed(err.body_text()))?;
                ingestion.accept_field(&name, value)?;
            }
        }
    }

    ingestion.complete().await
}

struct FieldChunks<'a>(Field<'a>);

#[async_trait]
impl ChunkSource for FieldChunks<'_> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.0.chunk().await?)
    }
}

pub async fn add_candidate<C>(
    State(usecase): State<Arc<CandidatesUseCase<C>>>,
    payload: Result<Json<AddCandidateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    C: CandidateRepository + Send + Sync + 'static,
{
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    match usecase
        .add_candidate(request.firstname, request.lastname)
        .await
    {
        Ok(candidate_id) => {
            info!(%candidate_id, "candidates: addcandidate succeeded");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse {
                    message: CANDIDATE_ADDED_MESSAGE.to_string(),
                }),
            ))
        }
        Err(err @ AddCandidateError::MissingNames) => Err(AppError::BadRequest(err.to_string())),
        Err(AddCandidateError::Store(err)) => Err(AppError::Internal(err)),
    }
}
