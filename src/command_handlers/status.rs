use crate::config::InstallerConfig;
use crate::download::sha256_file;
use crate::installer::{resolve_home, InstallPaths};
use crate::platform::platform;
use crate::receipt::Receipt;
use crate::shell::{ShellKind, ShellProfile};
use anyhow::{Context, Result};
use std::path::Path;

pub fn print_status(
    config_path: Option<&Path>,
    home: Option<&Path>,
    shell: Option<ShellKind>,
) -> Result<()> {
    let home = resolve_home(home)?;
    let mut cfg = InstallerConfig::load_or_default(config_path, &home)?;
    if shell.is_some() {
        cfg.shell = shell;
    }
    let paths = InstallPaths::resolve(home, &cfg.binary_name);
    let profile = ShellProfile::for_shell(cfg.shell_kind(), &paths.home);

    let installed = paths.binary.is_file();
    println!("binary:     {}", paths.binary.display());
    println!(
        "installed:  {}",
        match (installed, platform().is_executable(&paths.binary)) {
            (false, _) => "no",
            (true, true) => "yes",
            (true, false) => "yes (not executable)",
        }
    );
    let contents = profile
        .read()
        .with_context(|| format!("reading shell profile {}", profile.path.display()))?;
    let on_path = profile.contains_export(&contents, cfg.profile_match, &paths.bin_dir);
    println!("shell:      {:?}", profile.kind);
    println!(
        "profile:    {} ({})",
        profile.path.display(),
        if on_path { "PATH export present" } else { "PATH export missing" }
    );

    match Receipt::load(&paths.receipt)? {
        None => println!("receipt:    none"),
        Some(r) => {
            println!("version:    {}", r.release_version);
            println!("source:     {}", r.url);
            println!("date:       {}", r.installed_at.to_rfc3339());
            if installed {
                let digest = sha256_file(&paths.binary)?;
                println!(
                    "digest:     {}",
                    if digest == r.sha256 { "matches receipt" } else { "DIFFERS from receipt" }
                );
            }
        }
    }
    Ok(())
}
