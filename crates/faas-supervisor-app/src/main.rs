#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Standalone entrypoint: reads the trigger payload from stdin, runs one invocation
//! and prints the response as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use faas_supervisor_app::{load_context, read_stdin_payload, start_standalone};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "faas-supervisor",
    about = "Stage input, run the wrapped function and stage output for one invocation"
)]
struct Cli {
    /// Invocation context as a JSON document.
    #[arg(long, conflicts_with = "context_file")]
    context: Option<String>,
    /// File holding the invocation context as a JSON document.
    #[arg(long)]
    context_file: Option<PathBuf>,
}

/// Runs one invocation; exits non-zero when the response signals failure.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let context = load_context(cli.context.as_deref(), cli.context_file.as_deref()).await;
    let payload = read_stdin_payload().await;

    let response = start_standalone(context, payload).await;
    println!(
        "{}",
        serde_json::to_string(&response).context("failed to serialise response")?
    );
    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
