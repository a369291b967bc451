// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pj - resilient batch scoring of questionnaire records

mod color;
mod commands;
mod config;
mod env;
mod exit_error;
mod inputs;
mod logging;
mod output;
mod table;

use output::OutputFormat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{errors, run, status};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pj",
    version,
    about = "Persona Judge - resumable batch scoring with an LLM judge"
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "format",
        value_enum,
        default_value_t,
        global = true
    )]
    format: OutputFormat,

    /// Config file (default: ./pj.toml if present)
    #[arg(short = 'c', long = "config", global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score records matching the input patterns
    Run(run::RunArgs),
    /// Show the checkpoint of a batch output directory
    Status(status::StatusArgs),
    /// List journaled failures in a date range
    Errors(errors::ErrorsArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(exit_error::EXIT_USAGE, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {0}")]` with `#[from]`).
/// Otherwise we render the full chain so context isn't lost.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            e.print()?;
            return Ok(());
        }
        Err(e) => {
            let _ = e.print();
            return Err(exit_error::ExitError::new(exit_error::EXIT_USAGE, String::new()).into());
        }
    };
    let format = cli.format;
    let config = cli.config.as_deref();

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            // No subcommand provided, print help and exit 0
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Run(args) => run::handle(args, config, format).await?,
        Commands::Status(args) => {
            let _ = logging::init(None)?;
            status::handle(args, config, format)?
        }
        Commands::Errors(args) => {
            let _ = logging::init(None)?;
            errors::handle(args, format)?
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
