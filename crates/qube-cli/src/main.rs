//! Qube CLI - build, validate and inspect linked-data cubes.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            csv,
            definition,
            output,
            delimiter,
            lenient,
            json,
        } => commands::build::run(csv, definition, output, delimiter, lenient, json, cli.verbose),

        Commands::Validate {
            csv,
            definition,
            delimiter,
            single_observation_column,
            json,
        } => commands::validate::run(
            csv,
            definition,
            delimiter,
            single_observation_column,
            json,
            cli.verbose,
        ),

        Commands::Inspect {
            file,
            lenient,
            json,
        } => commands::inspect::run(file, lenient, json, cli.verbose),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
