use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::domain::value_objects::submission_contract::{
    RESUME_MIME_TYPE, RESUME_PART, VIDEO_MIME_TYPE, VIDEO_PART,
};

/// Named binary part of a candidate submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileSlot {
    Resume,
    Video,
}

impl FileSlot {
    pub const ALL: [FileSlot; 2] = [FileSlot::Resume, FileSlot::Video];

    pub fn part_name(self) -> &'static str {
        match self {
            FileSlot::Resume => RESUME_PART,
            FileSlot::Video => VIDEO_PART,
        }
    }

    pub fn from_part_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.part_name() == name)
    }

    /// Content type used when the part does not declare one.
    pub fn default_content_type(self) -> &'static str {
        match self {
            FileSlot::Resume => RESUME_MIME_TYPE,
            FileSlot::Video => VIDEO_MIME_TYPE,
        }
    }
}

impl Display for FileSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.part_name())
    }
}
