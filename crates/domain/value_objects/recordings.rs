use bytes::{Bytes, BytesMut};

use crate::domain::value_objects::submission_contract::VIDEO_MIME_TYPE;

/// Finished recording: the ordered concatenation of every chunk the recorder
/// received between start and stop.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoBlob {
    bytes: Bytes,
    mime_type: String,
}

impl VideoBlob {
    pub fn new(bytes: Bytes, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut buffer = BytesMut::new();
        for chunk in chunks {
            buffer.extend_from_slice(&chunk);
        }
        Self::new(buffer.freeze(), VIDEO_MIME_TYPE)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
