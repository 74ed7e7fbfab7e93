use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Record of the last successful install, kept next to the user's home.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Receipt {
    pub binary: PathBuf,
    pub release_version: String,
    pub url: String,
    pub sha256: String,
    pub size: u64,
    pub installed_at: DateTime<Utc>,
    #[serde(default)]
    pub installer_version: Option<String>,
}

impl Receipt {
    pub fn new(binary: PathBuf, release_version: &str, url: &str, sha256: &str, size: u64) -> Self {
        Self {
            binary,
            release_version: release_version.to_string(),
            url: url.to_string(),
            sha256: sha256.to_string(),
            size,
            installed_at: Utc::now(),
            installer_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    pub fn path(home: &Path) -> PathBuf {
        home.join(".quicktool").join("install-receipt.toml")
    }

    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        let receipt = toml::from_str(&data)
            .with_context(|| format!("parsing install receipt {}", path.display()))?;
        Ok(Some(receipt))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = toml::to_string_pretty(self).context("serializing install receipt")?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Returns whether a receipt was there to remove.
    pub fn remove(path: &Path) -> Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
