mod cli;
mod command_handlers;
mod config;
mod download;
mod error;
mod installer;
mod platform;
mod receipt;
mod shell;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;

fn main() -> ExitCode {
    // Usage errors exit 2, same as an invalid configuration.
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match command_handlers::dispatch::dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(error::exit_code_for(&err))
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("QUICKTOOL_INSTALL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}
