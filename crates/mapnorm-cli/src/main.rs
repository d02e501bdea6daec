//! mapnorm CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use mapnorm::MapError;
use mapnorm_cli::{Args, NOT_FOUND_MESSAGE, error_adapter::render_report, errors_are_logged};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting mapnorm");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = mapnorm_cli::run(&args) {
        if matches!(err, MapError::InputNotFound(_)) {
            println!("{NOT_FOUND_MESSAGE}");
        }

        let report = render_report(&err);
        if errors_are_logged(log_level) {
            error!("{report}");
        } else {
            eprintln!("{report}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
