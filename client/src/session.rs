use std::time::Duration;

use crates::domain::value_objects::{
    recordings::VideoBlob, submission_contract::MAX_RECORDING_SECS,
};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{info, warn};

use crate::capture::{
    CaptureDevice, CaptureError, MediaStream,
    recorder::{MediaRecorder, RecordingHandle},
};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    /// Force-stopped at the duration ceiling; the blob is kept.
    LimitExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not recording; the tick changed nothing.
    Ignored,
    Counting { elapsed_secs: u32 },
    LimitExceeded,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Camera and microphone access is required to record video.")]
    PermissionDenied,

    #[error(transparent)]
    Capture(CaptureError),

    #[error("Recorder failed")]
    Recorder(#[source] anyhow::Error),
}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied => SessionError::PermissionDenied,
            other => SessionError::Capture(other),
        }
    }
}

pub struct RecordingSessionController<D>
where
    D: CaptureDevice + Send + Sync,
{
    device: D,
    max_secs: u32,
    state: SessionState,
    stream: Option<MediaStream>,
    recording: Option<RecordingHandle>,
    elapsed_secs: u32,
    blob: Option<VideoBlob>,
    notice: Option<String>,
}

impl<D> RecordingSessionController<D>
where
    D: CaptureDevice + Send + Sync,
{
    pub fn new(device: D) -> Self {
        Self::with_limit(device, MAX_RECORDING_SECS)
    }

    pub fn with_limit(device: D, max_secs: u32) -> Self {
        Self {
            device,
            max_secs,
            state: SessionState::Idle,
            stream: None,
            recording: None,
            elapsed_secs: 0,
            blob: None,
            notice: None,
        }
    }

    /// Asks the device for a stream. Any previously held stream is released.
    pub async fn acquire(&mut self) -> Result<(), SessionError> {
        match self.device.acquire().await {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "session: capture device not acquired");
                Err(err.into())
            }
        }
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Recording {
            return Ok(());
        }

        let Some(stream) = self.stream.take() else {
            return Err(SessionError::PermissionDenied);
        };

        self.elapsed_secs = 0;
        self.blob = None;
        self.notice = None;
        self.recording = Some(MediaRecorder::record(stream));
        self.state = SessionState::Recording;

        info!(max_secs = self.max_secs, "session: recording started");
        Ok(())
    }

    /// Advances the clock by one second. Crossing the ceiling stops the
    /// recording and reports `LimitExceeded` exactly once.
    pub async fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if self.state != SessionState::Recording {
            return Ok(TickOutcome::Ignored);
        }

        if self.elapsed_secs + 1 > self.max_secs {
            self.finish_recording().await?;
            self.state = SessionState::LimitExceeded;
            self.notice = Some(format!(
                "Recording stopped: duration limit ({}s) exceeded.",
                self.max_secs
            ));
            warn!(max_secs = self.max_secs, "session: duration limit exceeded");
            return Ok(TickOutcome::LimitExceeded);
        }

        self.elapsed_secs += 1;
        Ok(TickOutcome::Counting {
            elapsed_secs: self.elapsed_secs,
        })
    }

    /// Manual stop. A no-op unless recording.
    pub async fn stop(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Recording {
            return Ok(());
        }

        self.finish_recording().await?;
        self.state = SessionState::Idle;
        info!(elapsed_secs = self.elapsed_secs, "session: recording stopped");
        Ok(())
    }

    /// Clears the limit notice after the user has seen it.
    pub fn acknowledge_limit(&mut self) {
        if self.state == SessionState::LimitExceeded {
            self.state = SessionState::Idle;
            self.notice = None;
        }
    }

    /// Starts recording and drives the one-second clock until either the
    /// ceiling is hit or a manual stop request arrives.
    pub async fn run(
        &mut self,
        mut stop_requests: mpsc::Receiver<()>,
    ) -> Result<SessionState, SessionError> {
        self.start()?;

        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_open = true;

        while self.state == SessionState::Recording {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await?;
                }
                request = stop_requests.recv(), if stop_open => match request {
                    Some(()) => self.stop().await?,
                    None => stop_open = false,
                },
            }
        }

        Ok(self.state)
    }

    /// Abandons any recording and gives the device back.
    pub fn teardown(&mut self) {
        if let Some(recording) = self.recording.take() {
            recording.abandon();
        }
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
        if self.state == SessionState::Recording {
            self.state = SessionState::Idle;
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn max_secs(&self) -> u32 {
        self.max_secs
    }

    /// Fraction of the allowed duration used so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.max_secs == 0 {
            return 1.0;
        }
        f64::from(self.elapsed_secs) / f64::from(self.max_secs)
    }

    pub fn blob(&self) -> Option<&VideoBlob> {
        self.blob.as_ref()
    }

    pub fn take_blob(&mut self) -> Option<VideoBlob> {
        self.blob.take()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    async fn finish_recording(&mut self) -> Result<(), SessionError> {
        if let Some(recording) = self.recording.take() {
            let blob = recording.stop().await.map_err(SessionError::Recorder)?;
            self.blob = Some(blob);
        }
        Ok(())
    }
}

impl<D> Drop for RecordingSessionController<D>
where
    D: CaptureDevice + Send + Sync,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
