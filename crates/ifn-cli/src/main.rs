//! IFN CLI - Conglomerado review console
//!
//! Command-line adapter over the review workflow: lists and filters units,
//! records approve/reject decisions, and requests generation batches.

mod backend;
mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod interactive;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;

fn main() {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(e) = result {
        let error = errors::from_anyhow(e);
        if json {
            println!("{}", error.to_json());
        } else {
            error.display();
        }
        std::process::exit(1);
    }
}
