use crate::config::InstallerConfig;
use crate::download::{self, Downloaded};
use crate::error::InstallError;
use crate::platform::platform;
use crate::receipt::Receipt;
use crate::shell::{ProfileUpdate, ShellProfile};
use fs_err as fs;
use reqwest::blocking::Client;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Filesystem locations one install touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    pub home: PathBuf,
    pub bin_dir: PathBuf,
    pub binary: PathBuf,
    pub receipt: PathBuf,
}

impl InstallPaths {
    pub fn resolve(home: PathBuf, binary_name: &str) -> Self {
        let p = platform();
        let bin_dir = p.bin_dir(&home);
        let binary = bin_dir.join(p.final_binary_name(binary_name));
        let receipt = Receipt::path(&home);
        Self {
            home,
            bin_dir,
            binary,
            receipt,
        }
    }
}

/// `--home`, then the platform's home variable, then whatever `dirs` finds.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf, InstallError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| platform().home_dir())
        .or_else(dirs::home_dir)
        .ok_or(InstallError::NoHome)
}

#[derive(Debug)]
pub struct InstallReport {
    pub created_bin_dir: bool,
    pub replaced_existing: bool,
    pub downloaded: Downloaded,
    pub profile: ProfileUpdate,
    /// `None` when the smoke test was skipped.
    pub smoke_test: Option<ExitStatus>,
}

impl InstallReport {
    /// The smoke test's exit code is what the installer exits with.
    pub fn exit_code(&self) -> u8 {
        match self.smoke_test {
            None => 0,
            Some(status) => status
                .code()
                .and_then(|c| u8::try_from(c).ok())
                .unwrap_or(1),
        }
    }
}

pub struct Installer<'a> {
    cfg: &'a InstallerConfig,
    paths: InstallPaths,
    profile: ShellProfile,
    client: Client,
}

impl<'a> Installer<'a> {
    pub fn new(cfg: &'a InstallerConfig, paths: InstallPaths) -> Result<Self, InstallError> {
        let profile = ShellProfile::for_shell(cfg.shell_kind(), &paths.home);
        let client = download::build_client(
            Duration::from_secs(cfg.timeout_secs),
            Duration::from_secs(cfg.connect_timeout_secs),
        )?;
        Ok(Self {
            cfg,
            paths,
            profile,
            client,
        })
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    pub fn profile(&self) -> &ShellProfile {
        &self.profile
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self) -> Result<InstallReport, InstallError> {
        let url = self.cfg.release_url();
        let created_bin_dir = self.ensure_bin_dir()?;
        let replaced_existing = self.remove_stale()?;
        println!("Downloading {url}");
        let downloaded = self.download(&url)?;
        self.make_executable()?;
        self.write_receipt(&url, &downloaded);
        let profile = self.ensure_profile()?;
        let smoke_test = if self.cfg.smoke_test {
            let path = self.search_path(std::env::var_os("PATH"))?;
            Some(self.smoke_test(path)?)
        } else {
            info!("smoke test skipped");
            None
        };
        Ok(InstallReport {
            created_bin_dir,
            replaced_existing,
            downloaded,
            profile,
            smoke_test,
        })
    }

    /// Returns whether the directory had to be created.
    pub fn ensure_bin_dir(&self) -> Result<bool, InstallError> {
        let dir = &self.paths.bin_dir;
        if dir.is_dir() {
            debug!(dir = %dir.display(), "binary directory exists");
            return Ok(false);
        }
        fs::create_dir_all(dir).map_err(|source| InstallError::BinDir {
            path: dir.clone(),
            source,
        })?;
        info!(dir = %dir.display(), "created binary directory");
        Ok(true)
    }

    /// Returns whether a previous binary was removed.
    pub fn remove_stale(&self) -> Result<bool, InstallError> {
        let path = &self.paths.binary;
        match fs::remove_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "removed previous binary");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(InstallError::RemoveStale {
                path: path.clone(),
                source,
            }),
        }
    }

    pub fn download(&self, url: &str) -> Result<Downloaded, InstallError> {
        let downloaded = download::download_to(&self.client, url, &self.paths.binary)?;
        info!(bytes = downloaded.bytes, sha256 = %downloaded.sha256, "downloaded");
        if let Some(expected) = &self.cfg.sha256 {
            download::verify_sha256(url, &downloaded.sha256, expected)?;
        }
        Ok(downloaded)
    }

    pub fn make_executable(&self) -> Result<(), InstallError> {
        let path = &self.paths.binary;
        platform()
            .make_executable(path)
            .map_err(|source| InstallError::Permissions {
                path: path.clone(),
                source,
            })
    }

    fn write_receipt(&self, url: &str, downloaded: &Downloaded) {
        let receipt = Receipt::new(
            self.paths.binary.clone(),
            &self.cfg.release_version,
            url,
            &downloaded.sha256,
            downloaded.bytes,
        );
        if let Err(e) = receipt.save(&self.paths.receipt) {
            warn!("could not write install receipt: {e:#}");
        }
    }

    pub fn ensure_profile(&self) -> Result<ProfileUpdate, InstallError> {
        if !self.cfg.modify_path {
            return Ok(ProfileUpdate::Skipped);
        }
        let update = self
            .profile
            .ensure_export(self.cfg.profile_match, &self.paths.bin_dir)
            .map_err(|source| InstallError::Profile {
                path: self.profile.path.clone(),
                source,
            })?;
        debug!(profile = %self.profile.path.display(), ?update, "profile checked");
        Ok(update)
    }

    /// `base` with the binary directory moved to the front.
    pub fn search_path(&self, base: Option<OsString>) -> Result<OsString, InstallError> {
        let bin_dir = &self.paths.bin_dir;
        let mut entries = vec![bin_dir.clone()];
        if let Some(base) = base {
            entries.extend(std::env::split_paths(&base).filter(|p| p != bin_dir));
        }
        std::env::join_paths(entries).map_err(|e| InstallError::SmokeTest {
            binary: self.cfg.binary_name.clone(),
            reason: format!("building PATH: {e}"),
        })
    }

    /// Resolve the binary through `path` and run `<binary> help` with that PATH.
    pub fn smoke_test(&self, path: OsString) -> Result<ExitStatus, InstallError> {
        let name = &self.cfg.binary_name;
        let fail = |reason: String| InstallError::SmokeTest {
            binary: name.clone(),
            reason,
        };
        let cwd = std::env::current_dir().unwrap_or_else(|_| self.paths.bin_dir.clone());
        let resolved = which::which_in(name, Some(&path), cwd)
            .map_err(|e| fail(format!("{name} not found on PATH: {e}")))?;
        debug!(binary = %resolved.display(), "running smoke test");
        let status = Command::new(&resolved)
            .arg("help")
            .env("PATH", &path)
            .status()
            .map_err(|e| fail(e.to_string()))?;
        if !status.success() {
            warn!(%status, "smoke test exited unsuccessfully");
        }
        Ok(status)
    }
}
