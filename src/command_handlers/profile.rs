use crate::config::InstallerConfig;
use crate::installer::{resolve_home, InstallPaths};
use crate::shell::{ProfileMatch, ProfileUpdate, ShellKind, ShellProfile};
use anyhow::{Context, Result};
use std::path::Path;

/// Without `apply` only prints what would be added, like a dry run.
pub fn profile_flow(
    config_path: Option<&Path>,
    home: Option<&Path>,
    shell: Option<ShellKind>,
    profile_match: Option<ProfileMatch>,
    apply: bool,
) -> Result<()> {
    let home = resolve_home(home)?;
    let mut cfg = InstallerConfig::load_or_default(config_path, &home)?;
    if shell.is_some() {
        cfg.shell = shell;
    }
    if let Some(mode) = profile_match {
        cfg.profile_match = mode;
    }
    let paths = InstallPaths::resolve(home, &cfg.binary_name);
    let profile = ShellProfile::for_shell(cfg.shell_kind(), &paths.home);

    if !apply {
        println!("Add the following to {}:\n\n{}\n", profile.path.display(), profile.line);
        return Ok(());
    }
    let update = profile
        .ensure_export(cfg.profile_match, &paths.bin_dir)
        .with_context(|| format!("updating {}", profile.path.display()))?;
    match update {
        ProfileUpdate::Appended => println!("Appended PATH export to {}", profile.path.display()),
        _ => println!("{} already has the PATH export", profile.path.display()),
    }
    Ok(())
}
