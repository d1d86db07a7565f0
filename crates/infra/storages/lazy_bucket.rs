use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::{
    repositories::storage::{ObjectStorage, ObjectWriter},
    value_objects::storage::NewStoredFile,
};

use super::s3_bucket::{S3BucketConfig, S3BucketStorage};

type Connector<S> = Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<S>> + Send>> + Send + Sync>;

/// Process-lifetime bucket handle that connects on first use.
///
/// Requests that arrive while the connection is being opened wait on the same
/// attempt instead of racing their own. A failed attempt leaves the handle
/// empty, so the next request tries again.
pub struct LazyObjectStorage<S> {
    cell: OnceCell<S>,
    connect: Connector<S>,
}

impl<S> LazyObjectStorage<S> {
    pub fn new<F, Fut>(connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            connect: Box::new(move || Box::pin(connect())),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<&S> {
        self.cell
            .get_or_try_init(|| async {
                match (self.connect)().await {
                    Ok(storage) => {
                        info!("object storage handle initialised");
                        Ok(storage)
                    }
                    Err(err) => {
                        warn!(error = ?err, "object storage handle failed to initialise");
                        Err(err)
                    }
                }
            })
            .await
            .context("object storage is unavailable")
    }
}

impl LazyObjectStorage<S3BucketStorage> {
    pub fn s3(config: S3BucketConfig) -> Self {
        Self::new(move || S3BucketStorage::connect(config.clone()))
    }
}

#[async_trait]
impl<S> ObjectStorage for LazyObjectStorage<S>
where
    S: ObjectStorage + Send + Sync,
{
    async fn open_writer(&self, file: &NewStoredFile) -> Result<Box<dyn ObjectWriter>> {
        self.get().await?.open_writer(file).await
    }
}
