use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crates::domain::value_objects::{
    candidates::CandidateFields, submission_contract::MAX_RECORDING_SECS,
};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "client", about = "Candidate intake: record an introduction and submit it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record an introduction video from an encoded WebM pipe or file
    Record(RecordArgs),
    /// Validate, review and upload a submission
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// FIFO or file producing WebM, e.g. `ffmpeg ... -f webm pipe:` into a mkfifo path
    #[arg(long)]
    pub device: PathBuf,

    /// Where the finished recording is written
    #[arg(long, default_value = "interview-video.webm")]
    pub output: PathBuf,

    /// Recording ceiling in seconds
    #[arg(long, default_value_t = MAX_RECORDING_SECS)]
    pub max_secs: u32,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Base URL of the intake server
    #[arg(long, env = "INTAKE_SERVER_URL", default_value = "http://localhost:3000")]
    pub server_url: Url,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Position applied for
    #[arg(long)]
    pub position: String,

    #[arg(long)]
    pub current_position: String,

    /// Years of experience
    #[arg(long)]
    pub experience: String,

    /// Resume (PDF, at most 5 MB)
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Recorded introduction video (WebM)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Skip the review confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl SubmitArgs {
    pub fn fields(&self) -> CandidateFields {
        CandidateFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position: self.position.clone(),
            current_position: self.current_position.clone(),
            experience: self.experience.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_with_defaults() {
        let cli = Cli::try_parse_from([
            "client",
            "submit",
            "--server-url",
            "http://intake.local:3000",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--position",
            "Engineer",
            "--current-position",
            "Analyst",
            "--experience",
            "4",
            "--resume",
            "cv.pdf",
        ])
        .unwrap();

        let Command::Submit(args) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(args.server_url.as_str(), "http://intake.local:3000/");
        assert_eq!(args.fields().current_position, "Analyst");
        assert!(args.video.is_none());
        assert!(!args.yes);
    }

    #[test]
    fn record_defaults_to_ninety_seconds() {
        let cli = Cli::try_parse_from(["client", "record", "--device", "/tmp/cam.fifo"]).unwrap();

        let Command::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(args.max_secs, 90);
        assert_eq!(args.output, PathBuf::from("interview-video.webm"));
    }
}
