use anyhow::{Context, Result};
use bytes::Bytes;
use crates::domain::value_objects::recordings::VideoBlob;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::debug;

use super::{DeviceLease, MediaStream};

pub struct MediaRecorder;

impl MediaRecorder {
    /// Starts collecting chunks from `stream` on a background task.
    pub fn record(stream: MediaStream) -> RecordingHandle {
        let (mut chunks_rx, lease) = stream.into_parts();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut chunks: Vec<Bytes> = Vec::new();

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    chunk = chunks_rx.recv() => match chunk {
                        Some(chunk) if !chunk.is_empty() => chunks.push(chunk),
                        Some(_) => {}
                        None => break,
                    },
                }
            }

            // Whatever the device delivered before stop still belongs to this take.
            while let Ok(chunk) = chunks_rx.try_recv() {
                if !chunk.is_empty() {
                    chunks.push(chunk);
                }
            }

            chunks
        });

        RecordingHandle {
            stop_tx: Some(stop_tx),
            task,
            lease,
        }
    }
}

pub struct RecordingHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Vec<Bytes>>,
    lease: DeviceLease,
}

impl RecordingHandle {
    /// Stops recording, releases the device and returns the assembled blob.
    pub async fn stop(mut self) -> Result<VideoBlob> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        let chunks = (&mut self.task)
            .await
            .context("recorder task ended abnormally")?;
        self.lease.release();

        debug!(chunks = chunks.len(), "recorder: chunks assembled");
        Ok(VideoBlob::from_chunks(chunks))
    }

    /// Drops the take and releases the device.
    pub fn abandon(mut self) {
        self.task.abort();
        self.lease.release();
    }
}
