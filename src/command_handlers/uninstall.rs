use crate::config::InstallerConfig;
use crate::installer::{resolve_home, InstallPaths};
use crate::receipt::Receipt;
use crate::shell::{ShellKind, ShellProfile};
use anyhow::{Context, Result};
use fs_err as fs;
use std::io;
use std::path::Path;

pub fn run_uninstall(
    config_path: Option<&Path>,
    home: Option<&Path>,
    shell: Option<ShellKind>,
    profile: bool,
) -> Result<()> {
    let home = resolve_home(home)?;
    let mut cfg = InstallerConfig::load_or_default(config_path, &home)?;
    if shell.is_some() {
        cfg.shell = shell;
    }
    let paths = InstallPaths::resolve(home, &cfg.binary_name);

    match fs::remove_file(&paths.binary) {
        Ok(()) => println!("Removed {}", paths.binary.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            println!("{} not installed", paths.binary.display())
        }
        Err(e) => return Err(e).context("removing installed binary"),
    }
    if Receipt::remove(&paths.receipt)? {
        println!("Removed {}", paths.receipt.display());
    }
    if profile {
        let shell_profile = ShellProfile::for_shell(cfg.shell_kind(), &paths.home);
        let changed = shell_profile
            .remove_export()
            .with_context(|| format!("editing {}", shell_profile.path.display()))?;
        if changed {
            println!("Removed PATH export from {}", shell_profile.path.display());
        } else {
            println!("No PATH export found in {}", shell_profile.path.display());
        }
    }
    Ok(())
}
