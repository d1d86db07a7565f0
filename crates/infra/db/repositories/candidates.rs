use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tokio::task;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::candidates},
};
use domain::{
    entities::candidates::CandidateEntity,
    repositories::candidates::CandidateRepository,
    value_objects::candidates::InsertCandidateModel,
};

pub struct CandidatePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CandidatePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CandidateRepository for CandidatePostgres {
    async fn insert(&self, candidate: InsertCandidateModel) -> Result<Uuid> {
        // Diesel and r2d2 block; keep them off the async workers.
        let db_pool = Arc::clone(&self.db_pool);

        let inserted = task::spawn_blocking(move || -> Result<CandidateEntity> {
            let mut conn = db_pool.get().context("candidate store unavailable")?;

            let entity = candidate.to_entity();

            insert_into(candidates::table)
                .values(&entity)
                .returning(CandidateEntity::as_returning())
                .get_result::<CandidateEntity>(&mut conn)
                .context("failed to insert candidate")
        })
        .await
        .context("candidate insert task failed")??;

        info!(
            candidate_id = %inserted.id,
            resume_file_name = ?inserted.resume_file_name,
            video_file_name = ?inserted.video_file_name,
            created_at = %inserted.created_at,
            "candidate record inserted"
        );

        Ok(inserted.id)
    }
}
