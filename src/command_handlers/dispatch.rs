use crate::cli::{Cli, Commands};
use crate::command_handlers::{install, profile, status, uninstall};
use anyhow::Result;
use std::process::ExitCode;

pub fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = cli.config.as_deref();
    let home = cli.home.as_deref();
    match cli.command.unwrap_or(Commands::Install(cli.install)) {
        Commands::Install(args) => install::run_install(&args, config, home),
        Commands::Uninstall { profile, shell } => {
            uninstall::run_uninstall(config, home, shell, profile)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status { shell } => {
            status::print_status(config, home, shell)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Profile {
            apply,
            shell,
            profile_match,
        } => {
            profile::profile_flow(config, home, shell, profile_match, apply)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
