//! Camera/microphone capture: acquiring a device, recording its encoded
//! chunks and assembling them into one [`VideoBlob`].
//!
//! [`VideoBlob`]: crates::domain::value_objects::recordings::VideoBlob

pub mod pipe_device;
pub mod recorder;

use async_trait::async_trait;
use bytes::Bytes;
use mockall::automock;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Permission to use the camera and microphone was denied")]
    PermissionDenied,

    #[error("Capture device is unavailable: {0}")]
    Unavailable(String),
}

/// Source of an encoded audio/video stream.
#[async_trait]
#[automock]
pub trait CaptureDevice {
    /// Suspends until the user grants or refuses access.
    async fn acquire(&self) -> Result<MediaStream, CaptureError>;
}

/// Exclusive hold on the input hardware. The producer stops as soon as the
/// lease is released, explicitly or by drop.
#[derive(Debug)]
pub struct DeviceLease {
    release: Option<oneshot::Sender<()>>,
}

impl DeviceLease {
    /// Returns the lease and the signal its producer waits on.
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { release: Some(tx) }, rx)
    }

    pub fn release(&mut self) {
        if let Some(tx) = self.release.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.release();
    }
}

/// Live stream handle: encoded chunks in arrival order plus the device lease.
#[derive(Debug)]
pub struct MediaStream {
    chunks: mpsc::Receiver<Bytes>,
    lease: DeviceLease,
}

impl MediaStream {
    pub fn new(chunks: mpsc::Receiver<Bytes>, lease: DeviceLease) -> Self {
        Self { chunks, lease }
    }

    pub fn into_parts(self) -> (mpsc::Receiver<Bytes>, DeviceLease) {
        (self.chunks, self.lease)
    }

    /// Gives the device back without recording.
    pub fn release(self) {
        drop(self);
    }
}

/// Producer end of a [`MediaStream`], used by device implementations.
#[derive(Debug)]
pub struct StreamFeed {
    pub chunks: mpsc::Sender<Bytes>,
    pub released: oneshot::Receiver<()>,
}

pub fn stream_channel(capacity: usize) -> (StreamFeed, MediaStream) {
    let (tx, rx) = mpsc::channel(capacity);
    let (lease, released) = DeviceLease::new();
    (
        StreamFeed {
            chunks: tx,
            released,
        },
        MediaStream::new(rx, lease),
    )
}
