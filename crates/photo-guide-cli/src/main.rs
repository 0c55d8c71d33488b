//! Photo Guide CLI - composition scoring and guided photo regeneration.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let outcome = match cli.command {
        Some(Commands::Analyze(args)) => commands::analyze::run(&args.with_config(&config)),
        Some(Commands::Generate(args)) => commands::generate::run(&args.with_config(&config)),
        Some(Commands::Guide(args)) => commands::guide::run(&args.with_config(&config)),
        Some(Commands::Health(args)) => commands::health::run(&args.with_config(&config)),
        // Default behavior: run the guided flow with flattened args
        None => commands::guide::run(&cli.guide.with_config(&config)),
    };

    let exit_code = outcome.unwrap_or_else(|e| {
        eprintln!("error: {e:#}");
        ExitCode::Error
    });

    exit_code.into()
}
