use std::collections::{BTreeMap, VecDeque};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use crates::domain::{
    repositories::storage::{ObjectStorage, ObjectWriter},
    value_objects::{
        enums::file_slots::FileSlot,
        storage::{NewStoredFile, StoredFileModel},
    },
};

use super::candidate_ingestion::ChunkSource;

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    bytes: Bytes,
}

/// Bucket double that keeps finished objects in memory.
#[derive(Clone, Default)]
pub struct InMemoryObjectStorage {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    aborted: Arc<AtomicUsize>,
    failing_slot: Option<FileSlot>,
}

impl InMemoryObjectStorage {
    /// Writes for `slot` fail on the first chunk.
    pub fn failing_for(slot: FileSlot) -> Self {
        Self {
            failing_slot: Some(slot),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn bytes_of(&self, filename: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(filename)
            .map(|object| object.bytes.to_vec())
    }

    pub fn content_type_of(&self, filename: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(filename)
            .map(|object| object.content_type.clone())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn open_writer(&self, file: &NewStoredFile) -> Result<Box<dyn ObjectWriter>> {
        Ok(Box::new(InMemoryWriter {
            storage: self.clone(),
            file: file.clone(),
            buffer: BytesMut::new(),
            fail: self.failing_slot == Some(file.slot),
        }))
    }
}

struct InMemoryWriter {
    storage: InMemoryObjectStorage,
    file: NewStoredFile,
    buffer: BytesMut,
    fail: bool,
}

#[async_trait]
impl ObjectWriter for InMemoryWriter {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        if self.fail {
            anyhow::bail!("bucket rejected write for {}", self.file.filename);
        }
        self.buffer.extend_from_slice(&chunk);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<StoredFileModel> {
        let bytes = self.buffer.freeze();
        let stored = StoredFileModel {
            filename: self.file.filename.clone(),
            object_key: format!("test/{}", self.file.filename),
            content_type: self.file.content_type.clone(),
            size_bytes: bytes.len() as u64,
        };

        self.storage.objects.lock().unwrap().insert(
            self.file.filename.clone(),
            StoredObject {
                content_type: self.file.content_type.clone(),
                bytes,
            },
        );

        Ok(stored)
    }

    async fn abort(self: Box<Self>) -> Result<()> {
        self.storage.aborted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Part body made of fixed chunks, optionally ending in a read error.
pub struct VecChunks {
    chunks: VecDeque<Bytes>,
    fail_at_end: bool,
}

impl VecChunks {
    pub fn new(chunks: Vec<&[u8]>) -> Self {
        Self {
            chunks: chunks
                .into_iter()
                .map(Bytes::copy_from_slice)
                .collect(),
            fail_at_end: false,
        }
    }

    pub fn then_fail(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

#[async_trait]
impl ChunkSource for VecChunks {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_at_end => anyhow::bail!("connection reset while reading part"),
            None => Ok(None),
        }
    }
}
