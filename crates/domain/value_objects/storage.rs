use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::file_slots::FileSlot;

/// Object about to be written to the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStoredFile {
    pub filename: String,
    pub slot: FileSlot,
    pub content_type: String,
    pub original_name: Option<String>,
}

/// Object durably written to the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFileModel {
    pub filename: String,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: u64,
}
