//! Ascribe CLI
//!
//! Renders AsciiDoc documents and prints derived views.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

/// Runs the command. Returns false if the file was not handled.
fn run(cli: Cli) -> Result<bool> {
    let transformer = commands::load_transformer(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { file } => commands::run_render(&transformer, &file),
        Commands::Headings {
            file,
            depth,
            keep_tags,
        } => commands::run_headings(&transformer, &file, depth, !keep_tags),
        Commands::TimeToRead { file, speed } => {
            commands::run_time_to_read(&transformer, &file, speed)
        }
        Commands::Transform { file } => commands::run_transform(&transformer, &file),
    }
}
