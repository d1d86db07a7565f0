//! Part names and limits shared by the intake client and the ingestion
//! gateway. Both sides build and parse multipart bodies from these constants
//! only, so a rename here is a contract change.

use serde::{Deserialize, Serialize};

pub const RESUME_PART: &str = "resume";
pub const VIDEO_PART: &str = "video";

pub const FIRST_NAME_FIELD: &str = "firstName";
pub const LAST_NAME_FIELD: &str = "lastName";
pub const POSITION_FIELD: &str = "position";
pub const CURRENT_POSITION_FIELD: &str = "currentPosition";
pub const EXPERIENCE_FIELD: &str = "experience";

pub const RESUME_MIME_TYPE: &str = "application/pdf";
pub const VIDEO_MIME_TYPE: &str = "video/webm";
pub const VIDEO_FILE_NAME: &str = "interview-video.webm";

pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_RECORDING_SECS: u32 = 90;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Upload successful";
pub const UPLOAD_FAILURE_MESSAGE: &str = "Upload failed";

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadReceipt {
    pub message: String,
    pub resume: Option<String>,
    pub video: Option<String>,
}

/// Body of a failed `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadFailure {
    pub error: String,
}
