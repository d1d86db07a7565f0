use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::value_objects::storage::{NewStoredFile, StoredFileModel};

/// Binary object bucket holding uploaded résumés and recordings.
#[async_trait]
pub trait ObjectStorage {
    async fn open_writer(&self, file: &NewStoredFile) -> Result<Box<dyn ObjectWriter>>;
}

/// Streaming write of one object. Nothing is visible in the bucket until
/// `finish` returns. A writer whose `finish` fails, or that is dropped before
/// it, leaves no partial data behind.
#[async_trait]
pub trait ObjectWriter: Send {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()>;

    async fn finish(self: Box<Self>) -> Result<StoredFileModel>;

    async fn abort(self: Box<Self>) -> Result<()>;
}
