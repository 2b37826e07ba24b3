// ABOUTME: Entry point for the rds-bluegreen CLI application.
// ABOUTME: Parses arguments, sets up logging and maps results to exit codes.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use rds_bluegreen::output::Output;
use tracing_subscriber::EnvFilter;

/// Crate logs at info; the AWS SDK only when something goes wrong.
const DEFAULT_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,aws_sdk_rds=warn";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output.into());

    let code = match run(cli.command, &output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            commands::EXIT_ERROR
        }
    };
    std::process::exit(code);
}

async fn run(command: Commands, output: &Output) -> rds_bluegreen::error::Result<i32> {
    match command {
        Commands::Reconcile { input, dry_run } => {
            commands::reconcile(&input.input, dry_run, Output::new(output.mode())).await
        }
        Commands::Plan { input } => {
            commands::reconcile(&input.input, true, Output::new(output.mode())).await
        }
        Commands::PostRun => commands::post_run(output),
    }
}
