use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::{CaptureDevice, CaptureError, MediaStream, stream_channel};

pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;
const CHANNEL_CAPACITY: usize = 32;

/// Reads an already-encoded WebM stream from a file or FIFO, e.g. one fed by
/// `ffmpeg -f v4l2 -i /dev/video0 ... -f webm pipe:`.
#[derive(Debug, Clone)]
pub struct PipeCaptureDevice {
    path: PathBuf,
    chunk_bytes: usize,
}

impl PipeCaptureDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_bytes: DEFAULT_CHUNK_BYTES,
        }
    }

    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }
}

#[async_trait]
impl CaptureDevice for PipeCaptureDevice {
    async fn acquire(&self) -> Result<MediaStream, CaptureError> {
        let mut file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::PermissionDenied => CaptureError::PermissionDenied,
                _ => CaptureError::Unavailable(format!("{}: {}", self.path.display(), err)),
            })?;

        let (mut feed, stream) = stream_channel(CHANNEL_CAPACITY);
        let chunk_bytes = self.chunk_bytes;
        let path = self.path.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; chunk_bytes];
            loop {
                let read = tokio::select! {
                    _ = &mut feed.released => break,
                    read = file.read(&mut buffer) => read,
                };

                match read {
                    Ok(0) => break,
                    Ok(n) => {
                        if feed
                            .chunks
                            .send(Bytes::copy_from_slice(&buffer[..n]))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "capture: read failed");
                        break;
                    }
                }
            }
            debug!(path = %path.display(), "capture: device released");
        });

        Ok(stream)
    }
}
