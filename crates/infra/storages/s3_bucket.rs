use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};
use bytes::{Bytes, BytesMut};
use tracing::{info, warn};

use crate::domain::{
    repositories::storage::{ObjectStorage, ObjectWriter},
    value_objects::storage::{NewStoredFile, StoredFileModel},
};

use super::s3::{S3Config, build_s3_client, map_s3_error, normalize_prefix};

/// S3 rejects non-final multipart parts below 5 MiB.
pub const MIN_PART_SIZE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_PART_SIZE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct S3BucketConfig {
    pub s3: S3Config,
    pub bucket: String,
    pub key_prefix: String,
    pub part_size_bytes: usize,
}

pub struct S3BucketStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_prefix: String,
    part_size_bytes: usize,
}

impl S3BucketStorage {
    /// Builds the client and checks that the bucket is reachable.
    pub async fn connect(config: S3BucketConfig) -> Result<Self> {
        let client = build_s3_client(&config.s3)
            .await
            .context("failed to build object storage s3 client")?;

        client
            .head_bucket()
            .bucket(&config.bucket)
            .send()
            .await
            .map_err(|err| map_s3_error(err, "reach bucket", &config.bucket, ""))?;

        info!(bucket = %config.bucket, "object storage bucket is reachable");

        Ok(Self {
            client,
            bucket: config.bucket,
            key_prefix: normalize_prefix(&config.key_prefix),
            part_size_bytes: config.part_size_bytes.max(MIN_PART_SIZE_BYTES),
        })
    }

    pub fn object_key(&self, filename: &str) -> String {
        format!("{}{}", self.key_prefix, filename)
    }
}

#[async_trait]
impl ObjectStorage for S3BucketStorage {
    async fn open_writer(&self, file: &NewStoredFile) -> Result<Box<dyn ObjectWriter>> {
        Ok(Box::new(S3ObjectWriter {
            client: self.client.clone(),
            bucket: self.bucket.clone(),
            object_key: self.object_key(&file.filename),
            file: file.clone(),
            part_size_bytes: self.part_size_bytes,
            buffer: BytesMut::new(),
            upload_id: None,
            completed_parts: Vec::new(),
            size_bytes: 0,
        }))
    }
}

/// Buffers incoming chunks and ships them as multipart parts once a full part
/// is available. Objects smaller than one part go up as a single PutObject.
struct S3ObjectWriter {
    client: aws_sdk_s3::Client,
    bucket: String,
    object_key: String,
    file: NewStoredFile,
    part_size_bytes: usize,
    buffer: BytesMut,
    upload_id: Option<String>,
    completed_parts: Vec<CompletedPart>,
    size_bytes: u64,
}

impl S3ObjectWriter {
    async fn ensure_multipart_upload(&mut self) -> Result<String> {
        if let Some(upload_id) = &self.upload_id {
            return Ok(upload_id.clone());
        }

        let response = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.object_key)
            .content_type(&self.file.content_type)
            .metadata("slot", self.file.slot.part_name())
            .send()
            .await
            .map_err(|err| {
                map_s3_error(err, "create multipart upload", &self.bucket, &self.object_key)
            })?;

        let upload_id = response
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing upload id for {}", self.object_key))?;

        self.upload_id = Some(upload_id.clone());
        Ok(upload_id)
    }

    async fn upload_part(&mut self, bytes: Bytes) -> Result<()> {
        let upload_id = self.ensure_multipart_upload().await?;
        let part_number = self.completed_parts.len() as i32 + 1;
        let content_length = bytes.len() as i64;

        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(&self.object_key)
            .upload_id(&upload_id)
            .part_number(part_number)
            .content_length(content_length)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| map_s3_error(err, "upload part", &self.bucket, &self.object_key))?;

        let e_tag = output
            .e_tag()
            .ok_or_else(|| anyhow::anyhow!("missing ETag for part {}", part_number))?;

        self.completed_parts.push(
            CompletedPart::builder()
                .e_tag(e_tag)
                .part_number(part_number)
                .build(),
        );

        info!(
            bucket = %self.bucket,
            key = %self.object_key,
            part_number,
            bytes_uploaded = content_length,
            "object part uploaded"
        );

        Ok(())
    }

    fn stored(&self) -> StoredFileModel {
        StoredFileModel {
            filename: self.file.filename.clone(),
            object_key: self.object_key.clone(),
            content_type: self.file.content_type.clone(),
            size_bytes: self.size_bytes,
        }
    }

    async fn complete_upload(&mut self) -> Result<StoredFileModel> {
        let remaining = self.buffer.split().freeze();

        if self.upload_id.is_none() {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&self.object_key)
                .content_type(&self.file.content_type)
                .metadata("slot", self.file.slot.part_name())
                .body(ByteStream::from(remaining))
                .send()
                .await
                .map_err(|err| map_s3_error(err, "put object", &self.bucket, &self.object_key))?;

            return Ok(self.stored());
        }

        if !remaining.is_empty() {
            self.upload_part(remaining).await?;
        }

        let upload_id = self.ensure_multipart_upload().await?;
        let upload = CompletedMultipartUpload::builder()
            .set_parts(Some(std::mem::take(&mut self.completed_parts)))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(&self.object_key)
            .upload_id(&upload_id)
            .multipart_upload(upload)
            .send()
            .await
            .map_err(|err| {
                map_s3_error(err, "complete multipart upload", &self.bucket, &self.object_key)
            })?;

        // Completed uploads have nothing left to abort on drop.
        self.upload_id = None;

        info!(
            bucket = %self.bucket,
            key = %self.object_key,
            size_bytes = self.size_bytes,
            "object multipart upload completed"
        );

        Ok(self.stored())
    }

    async fn abort_upload(&mut self) -> Result<()> {
        let Some(upload_id) = self.upload_id.take() else {
            return Ok(());
        };

        abort_multipart_upload(&self.client, &self.bucket, &self.object_key, &upload_id).await
    }
}

async fn abort_multipart_upload(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    object_key: &str,
    upload_id: &str,
) -> Result<()> {
    client
        .abort_multipart_upload()
        .bucket(bucket)
        .key(object_key)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(|err| map_s3_error(err, "abort multipart upload", bucket, object_key))?;

    warn!(
        bucket = %bucket,
        key = %object_key,
        upload_id = %upload_id,
        "object multipart upload aborted"
    );

    Ok(())
}

#[async_trait]
impl ObjectWriter for S3ObjectWriter {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.size_bytes += chunk.len() as u64;
        self.buffer.extend_from_slice(&chunk);

        while self.buffer.len() >= self.part_size_bytes {
            let part = self.buffer.split_to(self.part_size_bytes).freeze();
            self.upload_part(part).await?;
        }

        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> Result<StoredFileModel> {
        match self.complete_upload().await {
            Ok(stored) => Ok(stored),
            Err(err) => {
                if let Err(abort_err) = self.abort_upload().await {
                    warn!(
                        key = %self.object_key,
                        error = ?abort_err,
                        "failed to abort multipart upload after finish error"
                    );
                }
                Err(err)
            }
        }
    }

    async fn abort(mut self: Box<Self>) -> Result<()> {
        self.abort_upload().await
    }
}

/// A writer dropped mid-stream (request timeout, client disconnect) still
/// holds an open multipart upload; its parts are discarded in the background.
impl Drop for S3ObjectWriter {
    fn drop(&mut self) {
        let Some(upload_id) = self.upload_id.take() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                key = %self.object_key,
                upload_id = %upload_id,
                "multipart upload left open: no runtime to abort it"
            );
            return;
        };

        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let object_key = self.object_key.clone();

        runtime.spawn(async move {
            if let Err(err) = abort_multipart_upload(&client, &bucket, &object_key, &upload_id).await
            {
                warn!(
                    key = %object_key,
                    error = ?err,
                    "failed to abort dropped multipart upload"
                );
            }
        });
    }
}
