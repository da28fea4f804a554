// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — bind an ordered list of images into a single PDF.
//
// Entry point. Parses arguments, initialises logging, and dispatches to the
// export and inspect commands.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Bind an ordered list of images into one fixed-width PDF", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export images to a PDF, one page per image, in argument order
    Export(commands::ExportArgs),

    /// Print the page count and page sizes of a PDF
    Inspect {
        /// PDF file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Export(args) => commands::export(args).await,
        Command::Inspect { file } => commands::inspect(&file),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = folio_core::human_errors::humanize_error(&err);
            tracing::debug!(error = %err, "command failed");
            eprintln!("folio: {} {}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
