use crate::cli::InstallArgs;
use crate::error::InstallError;
use crate::shell::{ProfileMatch, ShellKind};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Everything that decides what gets installed and how. Built from defaults,
/// then an optional TOML file, then command line flags.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    pub host: String,
    pub org: String,
    pub repo: String,
    /// Release tag, or `latest`.
    pub release_version: String,
    /// Asset file name. Supports {version}, {os}, {arch}
    pub asset: String,
    pub binary_name: String,
    /// Full download URL; bypasses host/org/repo/asset when set.
    pub url: Option<String>,
    pub sha256: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub shell: Option<ShellKind>,
    pub profile_match: ProfileMatch,
    pub modify_path: bool,
    pub smoke_test: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            host: "github.com".into(),
            org: "quicktool-dev".into(),
            repo: "quicktool".into(),
            release_version: "v0.1.0".into(),
            asset: "quicktool".into(),
            binary_name: "quicktool".into(),
            url: None,
            sha256: None,
            timeout_secs: 300,
            connect_timeout_secs: 30,
            shell: None,
            profile_match: ProfileMatch::Literal,
            modify_path: true,
            smoke_test: true,
        }
    }
}

impl InstallerConfig {
    pub fn default_path(home: &Path) -> PathBuf {
        home.join(".config").join("quicktool").join("install.toml")
    }

    pub fn load(path: &Path) -> Result<Self, InstallError> {
        let data = fs::read_to_string(path).map_err(|e| InstallError::Config(e.to_string()))?;
        toml::from_str(&data)
            .map_err(|e| InstallError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load_or_default(explicit: Option<&Path>, home: &Path) -> Result<Self, InstallError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Self::default_path(home);
        match std::fs::metadata(&fallback) {
            Ok(_) => Self::load(&fallback),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(InstallError::Config(format!("{}: {e}", fallback.display()))),
        }
    }

    pub fn apply_overrides(&mut self, args: &InstallArgs) {
        if let Some(url) = &args.url {
            self.url = Some(url.clone());
        }
        if let Some(v) = &args.release_version {
            self.release_version = v.clone();
        }
        if let Some(sum) = &args.sha256 {
            self.sha256 = Some(sum.clone());
        }
        if let Some(shell) = args.shell {
            self.shell = Some(shell);
        }
        if let Some(mode) = args.profile_match {
            self.profile_match = mode;
        }
        if let Some(secs) = args.timeout {
            self.timeout_secs = secs;
        }
        if args.no_modify_path {
            self.modify_path = false;
        }
        if args.skip_smoke_test {
            self.smoke_test = false;
        }
    }

    pub fn validate(&mut self) -> Result<(), InstallError> {
        let bad = |msg: String| Err(InstallError::Config(msg));
        if self.binary_name.trim().is_empty() {
            return bad("binary_name must not be empty".into());
        }
        if self.binary_name.contains(['/', '\\']) {
            return bad(format!("binary_name '{}' must be a plain file name", self.binary_name));
        }
        if self.release_version != "latest"
            && semver::Version::parse(self.release_version.trim_start_matches('v')).is_err()
        {
            return bad(format!(
                "release_version '{}' is neither 'latest' nor a semver tag",
                self.release_version
            ));
        }
        if let Some(sum) = self.sha256.as_mut() {
            if sum.len() != 64 || !sum.chars().all(|c| c.is_ascii_hexdigit()) {
                return bad(format!("sha256 '{sum}' must be 64 hex characters"));
            }
            sum.make_ascii_lowercase();
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return bad(format!("url '{url}' must be http(s)"));
            }
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return bad("timeouts must be greater than zero".into());
        }
        Ok(())
    }

    pub fn shell_kind(&self) -> ShellKind {
        self.shell
            .unwrap_or_else(|| ShellKind::detect(std::env::var_os("SHELL").as_deref()))
    }

    /// Expand placeholders into the concrete download URL.
    pub fn release_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let asset = self
            .asset
            .replace("{version}", self.release_version.trim_start_matches('v'))
            .replace("{os}", std::env::consts::OS)
            .replace("{arch}", std::env::consts::ARCH);
        if self.release_version == "latest" {
            format!(
                "https://{}/{}/{}/releases/latest/download/{asset}",
                self.host, self.org, self.repo
            )
        } else {
            format!(
                "https://{}/{}/{}/releases/download/{}/{asset}",
                self.host, self.org, self.repo, self.release_version
            )
        }
    }
}
