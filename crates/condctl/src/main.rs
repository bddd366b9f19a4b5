//! # condctl
//!
//! Command-line tool for inspecting and mutating resource status conditions.
//!
//! Reads a status document (JSON or YAML) from a file or stdin, applies one
//! operation of the condition engine, and prints the result to stdout. Logs go
//! to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Add missing conditions of the set
//! condctl --set set.yaml --status status.yaml init
//!
//! # Report a failing sub-component
//! kubectl get ksvc hello -o json | jq .status | \
//!   condctl --set set.yaml mark-false RoutesReady --reason NotFound --message "route missing"
//!
//! # Exit 0 only when the top-level condition is True
//! condctl --set set.yaml --status status.yaml happy
//! ```

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{Operation, Outcome};
use conditions::duck::{v1, v1beta1};
use config::{CliConfig, OutputFormat, DEFAULT_LOG_FILTER};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Status condition CLI
#[derive(Debug, Parser)]
#[command(name = "condctl")]
#[command(about = "Inspect and mutate resource status conditions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Status document to read (stdin when omitted or "-")
    #[arg(short, long, global = true)]
    status: Option<PathBuf>,

    /// Condition set document (defaults to CONDCTL_CONDITION_SET, then the living set)
    #[arg(long, global = true)]
    set: Option<PathBuf>,

    /// Output format (defaults to CONDCTL_OUTPUT, then json)
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add every condition of the set that is missing
    Init,
    /// Mark a condition True
    MarkTrue {
        /// Condition type
        r#type: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// Mark a condition False
    MarkFalse {
        /// Condition type
        r#type: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Mark a condition Unknown
    MarkUnknown {
        /// Condition type
        r#type: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Remove a condition
    Clear {
        /// Condition type
        r#type: String,
    },
    /// Print one condition; fails when it is absent
    Get {
        /// Condition type
        r#type: String,
    },
    /// Print whether the top-level condition is True; exit code 1 otherwise
    Happy,
    /// Project a v1 status onto v1beta1
    Narrow,
    /// Read a v1beta1 status back as v1
    Widen,
    /// Print the JSON schema of the v1 status
    Schema,
}

impl Commands {
    fn operation(&self) -> Option<Operation> {
        match self {
            Commands::Init => Some(Operation::Initialize),
            Commands::MarkTrue {
                r#type,
                reason,
                message,
            } => Some(Operation::MarkTrue {
                r#type: r#type.clone(),
                reason: reason.clone(),
                message: message.clone(),
            }),
            Commands::MarkFalse {
                r#type,
                reason,
                message,
            } => Some(Operation::MarkFalse {
                r#type: r#type.clone(),
                reason: reason.clone(),
                message: message.clone(),
            }),
            Commands::MarkUnknown {
                r#type,
                reason,
                message,
            } => Some(Operation::MarkUnknown {
                r#type: r#type.clone(),
                reason: reason.clone(),
                message: message.clone(),
            }),
            Commands::Clear { r#type } => Some(Operation::Clear {
                r#type: r#type.clone(),
            }),
            _ => None,
        }
    }
}

fn run(cli: &Cli, config: &CliConfig) -> Result<Outcome> {
    let format = cli.output.unwrap_or(config.output);
    let set_path = cli
        .set
        .clone()
        .or_else(|| config.condition_set.as_ref().map(PathBuf::from));
    let set = commands::load_condition_set(set_path.as_deref())?;
    let status_path = cli.status.as_deref();

    match &cli.command {
        Commands::Get { r#type } => {
            let status: v1::Status = commands::load_document(status_path)?;
            commands::get(&status, r#type, format)
        }
        Commands::Happy => {
            let status: v1::Status = commands::load_document(status_path)?;
            Ok(commands::happy(&set, &status))
        }
        Commands::Narrow => {
            let status: v1::Status = commands::load_document(status_path)?;
            commands::narrow(&set, &status, format)
        }
        Commands::Widen => {
            let status: v1beta1::Status = commands::load_document(status_path)?;
            commands::widen(&status, format)
        }
        Commands::Schema => commands::schema(format),
        command => {
            let op = command
                .operation()
                .context("command does not mutate a status")?;
            let status: v1::Status = commands::load_document(status_path)?;
            commands::mutate(&set, status, &op, format)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    match run(&cli, &config) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
