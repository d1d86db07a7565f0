use std::fmt::Display;

use anyhow::Context;
use crates::domain::value_objects::{
    candidates::{CandidateFields, DocumentFile},
    enums::{file_slots::FileSlot, scalar_fields::ScalarField},
    recordings::VideoBlob,
    submission_contract::{UploadReceipt, VIDEO_FILE_NAME},
    validation::{CandidateRules, ValidationErrors},
};
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Please attach your resume before submitting.")]
    MissingDocument,

    #[error("Please record a video before submitting.")]
    MissingVideo,

    #[error("Some fields need attention: {0}")]
    Validation(ValidationErrors),

    #[error("Failed to submit (server responded with status {status})")]
    TransmissionFailure { status: u16 },

    #[error("Failed to reach the intake server")]
    Transport(#[source] anyhow::Error),
}

/// Everything one `POST /upload` carries.
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    fields: CandidateFields,
    document: DocumentFile,
    video: VideoBlob,
}

impl MultipartPayload {
    pub fn fields(&self) -> &CandidateFields {
        &self.fields
    }

    pub fn document(&self) -> &DocumentFile {
        &self.document
    }

    pub fn video(&self) -> &VideoBlob {
        &self.video
    }

    /// Part names in send order: scalar fields first, then the files.
    pub fn part_names(&self) -> Vec<&'static str> {
        ScalarField::ALL
            .iter()
            .map(|field| field.part_name())
            .chain(FileSlot::ALL.iter().map(|slot| slot.part_name()))
            .collect()
    }

    pub fn into_form(self) -> anyhow::Result<Form> {
        let mut form = Form::new();
        for field in ScalarField::ALL {
            form = form.text(field.part_name(), self.fields.get(field).to_string());
        }

        let resume = Part::bytes(self.document.bytes.to_vec())
            .file_name(self.document.file_name.clone())
            .mime_str(&self.document.content_type)
            .with_context(|| format!("invalid resume content type {}", self.document.content_type))?;

        let video_type = self.video.mime_type().to_string();
        let video = Part::bytes(self.video.into_bytes().to_vec())
            .file_name(VIDEO_FILE_NAME)
            .mime_str(&video_type)
            .with_context(|| format!("invalid video content type {}", video_type))?;

        Ok(form
            .part(FileSlot::Resume.part_name(), resume)
            .part(FileSlot::Video.part_name(), video))
    }
}

/// Packages the form, the résumé and the recording. Both files are
/// mandatory and are checked before anything else.
#[derive(Debug, Clone, Default)]
pub struct SubmissionAssembler {
    rules: CandidateRules,
}

impl SubmissionAssembler {
    pub fn new(rules: CandidateRules) -> Self {
        Self { rules }
    }

    pub fn assemble(
        &self,
        fields: CandidateFields,
        document: Option<DocumentFile>,
        video: Option<VideoBlob>,
    ) -> Result<MultipartPayload, SubmissionError> {
        let document = document.ok_or(SubmissionError::MissingDocument)?;
        let video = video
            .filter(|blob| !blob.is_empty())
            .ok_or(SubmissionError::MissingVideo)?;

        self.rules
            .validate(&fields, Some(&document))
            .map_err(SubmissionError::Validation)?;

        Ok(MultipartPayload {
            fields,
            document,
            video,
        })
    }
}

/// Final confirmation shown before sending.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub fields: CandidateFields,
    pub resume_name: String,
    pub resume_bytes: u64,
    pub video_bytes: u64,
}

impl From<&MultipartPayload> for ReviewSummary {
    fn from(payload: &MultipartPayload) -> Self {
        Self {
            fields: payload.fields.clone(),
            resume_name: payload.document.file_name.clone(),
            resume_bytes: payload.document.size_bytes(),
            video_bytes: payload.video.len() as u64,
        }
    }
}

impl Display for ReviewSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Candidate Details")?;
        writeln!(f, "  First Name: {}", self.fields.first_name)?;
        writeln!(f, "  Last Name: {}", self.fields.last_name)?;
        writeln!(f, "  Position Applied For: {}", self.fields.position)?;
        writeln!(f, "  Current Position: {}", self.fields.current_position)?;
        writeln!(f, "  Experience (Years): {}", self.fields.experience)?;
        writeln!(f, "Uploaded Resume: {} ({} bytes)", self.resume_name, self.resume_bytes)?;
        write!(f, "Recorded Video: {} ({} bytes)", VIDEO_FILE_NAME, self.video_bytes)
    }
}

/// Sends one payload per call. Failures are reported, never retried.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    upload_url: Url,
}

impl SubmissionClient {
    pub fn new(server_url: &Url) -> anyhow::Result<Self> {
        Self::with_client(reqwest::Client::new(), server_url)
    }

    pub fn with_client(http: reqwest::Client, server_url: &Url) -> anyhow::Result<Self> {
        let mut base = server_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let upload_url = base
            .join("upload")
            .with_context(|| format!("invalid server url {}", server_url))?;

        Ok(Self { http, upload_url })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    pub async fn submit(&self, payload: MultipartPayload) -> Result<UploadReceipt, SubmissionError> {
        let form = payload.into_form().map_err(SubmissionError::Transport)?;

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.into()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %self.upload_url, "submission: upload rejected");
            return Err(SubmissionError::TransmissionFailure {
                status: status.as_u16(),
            });
        }

        let receipt = response
            .json::<UploadReceipt>()
            .await
            .map_err(|err| SubmissionError::Transport(err.into()))?;

        info!(
            resume = ?receipt.resume,
            video = ?receipt.video,
            "submission: upload accepted"
        );
        Ok(receipt)
    }
}
