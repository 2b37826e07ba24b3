// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rds_bluegreen::config::DEFAULT_INPUT_PATH;
use rds_bluegreen::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rds-bluegreen")]
#[command(about = "Reconcile AWS RDS Blue/Green deployments from a pipeline step")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Normal)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one reconciliation pass
    Reconcile {
        #[command(flatten)]
        input: InputArgs,

        /// Plan and log only; no mutating RDS calls
        #[arg(
            long,
            env = "DRY_RUN",
            action = ArgAction::Set,
            default_value = "True",
            value_parser = parse_bool_like
        )]
        dry_run: bool,
    },

    /// Show the actions a pass would take, without applying them
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Fail if an earlier step requested a rerun
    PostRun,
}

#[derive(Args)]
pub struct InputArgs {
    /// Input file (YAML or JSON)
    #[arg(long, env = "INPUT_FILE", default_value = DEFAULT_INPUT_PATH)]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Normal,
    Quiet,
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Normal => OutputMode::Normal,
            OutputFormat::Quiet => OutputMode::Quiet,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}

/// Accepts the usual spellings of a boolean environment flag.
pub fn parse_bool_like(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}
