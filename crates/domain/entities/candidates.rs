use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::candidates;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = candidates)]
pub struct CandidateEntity {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub current_position: Option<String>,
    pub experience: Option<f64>,
    pub resume_file_name: Option<String>,
    pub video_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = candidates)]
pub struct InsertCandidateEntity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub current_position: Option<String>,
    pub experience: Option<f64>,
    pub resume_file_name: Option<String>,
    pub video_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
