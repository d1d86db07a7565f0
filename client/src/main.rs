use anyhow::Result;
use clap::Parser;
use client::{
    commands,
    config::cli_args::{Cli, Command},
};
use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Client exited with error: {:#}", error);
        eprintln!("{:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("client")?;

    let cli = Cli::parse();

    match cli.command {
        Command::Record(args) => commands::record(args).await,
        Command::Submit(args) => commands::submit(args).await,
    }
}
