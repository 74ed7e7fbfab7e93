use crate::shell::{ProfileMatch, ShellKind};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    name = "quicktool-install",
    about = "Install quicktool into ~/bin, put ~/bin on PATH and check that it runs",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    // `install` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub install: InstallArgs,

    /// Installer config file (defaults to ~/.config/quicktool/install.toml when present)
    #[arg(short, long, global = true, env = "QUICKTOOL_INSTALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Home directory to install under (defaults to $HOME)
    #[arg(long, global = true, env = "QUICKTOOL_INSTALL_HOME")]
    pub home: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download quicktool, install it as ~/bin/quicktool and run `quicktool help`
    Install(InstallArgs),
    /// Remove the installed binary and its receipt
    Uninstall {
        /// Also remove the PATH export line from the shell profile
        #[arg(long)]
        profile: bool,
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,
    },
    /// Show where quicktool is installed and whether PATH is set up
    Status {
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,
    },
    /// Print the shell profile line; with --apply, add it to the profile
    Profile {
        /// Append the export line to the profile if missing
        #[arg(long)]
        apply: bool,
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,
        #[arg(long, value_enum)]
        profile_match: Option<ProfileMatch>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct InstallArgs {
    /// Download from this URL instead of the GitHub release
    #[arg(long, env = "QUICKTOOL_INSTALL_URL")]
    pub url: Option<String>,
    /// Release tag to install (e.g. v0.1.0) or `latest`
    #[arg(long, env = "QUICKTOOL_INSTALL_VERSION")]
    pub release_version: Option<String>,
    /// Expected SHA-256 of the downloaded binary
    #[arg(long, env = "QUICKTOOL_INSTALL_SHA256")]
    pub sha256: Option<String>,
    /// Shell whose profile gets the PATH export (defaults to $SHELL, then bash)
    #[arg(long, value_enum, env = "QUICKTOOL_INSTALL_SHELL")]
    pub shell: Option<ShellKind>,
    /// How an existing PATH export is recognised
    #[arg(long, value_enum)]
    pub profile_match: Option<ProfileMatch>,
    /// Leave the shell profile untouched
    #[arg(long)]
    pub no_modify_path: bool,
    /// Do not run `quicktool help` after installing
    #[arg(long)]
    pub skip_smoke_test: bool,
    /// Total download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}
