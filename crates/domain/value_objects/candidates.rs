use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::candidates::InsertCandidateEntity,
    value_objects::enums::scalar_fields::ScalarField,
};

/// Raw applicant metadata as typed into the intake form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFields {
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub current_position: String,
    pub experience: String,
}

impl CandidateFields {
    pub fn get(&self, field: ScalarField) -> &str {
        match field {
            ScalarField::FirstName => &self.first_name,
            ScalarField::LastName => &self.last_name,
            ScalarField::Position => &self.position,
            ScalarField::CurrentPosition => &self.current_position,
            ScalarField::Experience => &self.experience,
        }
    }

    pub fn set(&mut self, field: ScalarField, value: String) {
        match field {
            ScalarField::FirstName => self.first_name = value,
            ScalarField::LastName => self.last_name = value,
            ScalarField::Position => self.position = value,
            ScalarField::CurrentPosition => self.current_position = value,
            ScalarField::Experience => self.experience = value,
        }
    }
}

/// Résumé picked from disk, held in memory until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl DocumentFile {
    /// Content type is guessed from the file extension.
    pub fn new(file_name: impl Into<String>, bytes: Bytes) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Candidate record ready for the metadata store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InsertCandidateModel {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub current_position: Option<String>,
    pub experience: Option<f64>,
    pub resume_file_name: Option<String>,
    pub video_file_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl InsertCandidateModel {
    pub fn to_entity(&self) -> InsertCandidateEntity {
        InsertCandidateEntity {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position: self.position.clone(),
            current_position: self.current_position.clone(),
            experience: self.experience,
            resume_file_name: self.resume_file_name.clone(),
            video_file_name: self.video_file_name.clone(),
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Parses a years-of-experience value. Blank input means "not provided".
pub fn parse_experience(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(years) if years.is_finite() => Ok(Some(years)),
        _ => Err(format!("experience must be a number, got {:?}", trimmed)),
    }
}
