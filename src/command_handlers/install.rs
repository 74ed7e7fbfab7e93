use crate::cli::InstallArgs;
use crate::config::InstallerConfig;
use crate::installer::{resolve_home, InstallPaths, Installer};
use crate::shell::ProfileUpdate;
use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

pub fn run_install(
    args: &InstallArgs,
    config_path: Option<&Path>,
    home: Option<&Path>,
) -> Result<ExitCode> {
    let home = resolve_home(home)?;
    let mut cfg = InstallerConfig::load_or_default(config_path, &home)?;
    cfg.apply_overrides(args);
    cfg.validate()?;
    debug!(?cfg, "effective configuration");

    let paths = InstallPaths::resolve(home, &cfg.binary_name);
    let installer = Installer::new(&cfg, paths)?;
    let report = installer.run()?;

    let paths = installer.paths();
    if report.created_bin_dir {
        println!("Created {}", paths.bin_dir.display());
    }
    println!(
        "{} {} {} -> {} ({} bytes, sha256 {})",
        if report.replaced_existing { "Reinstalled" } else { "Installed" },
        cfg.binary_name,
        cfg.release_version,
        paths.binary.display(),
        report.downloaded.bytes,
        report.downloaded.sha256,
    );
    let profile = installer.profile();
    match report.profile {
        ProfileUpdate::Appended => println!(
            "Added `{}` to {}. Open a new shell or source it to pick up PATH.",
            profile.line,
            profile.path.display()
        ),
        ProfileUpdate::AlreadyPresent => println!(
            "{} already puts {} on PATH",
            profile.path.display(),
            paths.bin_dir.display()
        ),
        ProfileUpdate::Skipped => println!(
            "Left shell profile untouched; add {} to PATH yourself.",
            paths.bin_dir.display()
        ),
    }
    if let Some(status) = report.smoke_test {
        if !status.success() {
            eprintln!(
                "warning: {} is installed but `{} help` exited with {status}",
                paths.binary.display(),
                cfg.binary_name
            );
        }
    }
    Ok(ExitCode::from(report.exit_code()))
}
