use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use crates::domain::value_objects::{
    candidates::DocumentFile, recordings::VideoBlob, submission_contract::VIDEO_MIME_TYPE,
};
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    capture::pipe_device::PipeCaptureDevice,
    config::cli_args::{RecordArgs, SubmitArgs},
    session::{RecordingSessionController, SessionState},
    submission::{ReviewSummary, SubmissionAssembler, SubmissionClient},
};

/// Records until Ctrl+C or the ceiling, then writes the blob to disk.
pub async fn record(args: RecordArgs) -> Result<()> {
    let mut session =
        RecordingSessionController::with_limit(PipeCaptureDevice::new(&args.device), args.max_secs);
    session.acquire().await?;

    let (stop_tx, stop_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(()).await;
        }
    });

    println!("Recording... press Ctrl+C to stop (limit {}s).", session.max_secs());
    let state = session.run(stop_rx).await?;

    if let Some(notice) = session.notice() {
        println!("{}", notice);
    }
    if state == SessionState::LimitExceeded {
        session.acknowledge_limit();
    }

    let elapsed_secs = session.elapsed_secs();
    let blob = session
        .take_blob()
        .context("recording produced no video")?;
    tokio::fs::write(&args.output, blob.bytes())
        .await
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        size_bytes = blob.len(),
        elapsed_secs,
        "record: video saved"
    );
    println!("Saved {} ({} bytes, {}s).", args.output.display(), blob.len(), elapsed_secs);

    Ok(())
}

/// Validates, shows the review, asks for confirmation and uploads once.
pub async fn submit(args: SubmitArgs) -> Result<()> {
    let document = match &args.resume {
        Some(path) => Some(load_document(path).await?),
        None => None,
    };
    let video = match &args.video {
        Some(path) => Some(load_video(path).await?),
        None => None,
    };

    let payload = SubmissionAssembler::default().assemble(args.fields(), document, video)?;

    println!("{}", ReviewSummary::from(&payload));
    if !args.yes && !confirm("Submit application? [y/N] ")? {
        println!("Submission cancelled.");
        return Ok(());
    }

    let receipt = SubmissionClient::new(&args.server_url)?
        .submit(payload)
        .await?;

    println!("Application submitted successfully!");
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

async fn load_document(path: &Path) -> Result<DocumentFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read resume {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.pdf");

    Ok(DocumentFile::new(file_name, Bytes::from(bytes)))
}

async fn load_video(path: &Path) -> Result<VideoBlob> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read video {}", path.display()))?;

    Ok(VideoBlob::new(Bytes::from(bytes), VIDEO_MIME_TYPE))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer)? == 0 {
        bail!("no answer on stdin; pass --yes to submit without review");
    }
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
