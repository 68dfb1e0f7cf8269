mod cli;
mod commands;
mod config;
mod corpus;
mod model;
mod remediation;
mod report;
mod rubric;
mod structure;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(1);
        }
    }
}

/// Returns whether the quality gate passed.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Page(args) => commands::page::run(args),
        Commands::Wiki(args) => commands::wiki::run(args),
        Commands::Rubric(args) => commands::rubric::run(args).map(|()| true),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
