use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of one installer step. Every variant maps to its own exit code so a
/// failed run can be diagnosed from the shell alone. Messages leave the
/// underlying cause to the error chain (`{:#}`).
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot determine home directory (set HOME or pass --home)")]
    NoHome,

    #[error("creating binary directory {}", path.display())]
    BinDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("removing previous install {}", path.display())]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("downloading {url}")]
    Download {
        url: String,
        #[source]
        source: DownloadError,
    },

    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    Checksum {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("marking {} executable", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("updating shell profile {}", path.display())]
    Profile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("installed, but the smoke test `{binary} help` could not run: {reason}")]
    SmokeTest { binary: String, reason: String },
}

impl InstallError {
    pub fn exit_code(&self) -> u8 {
        match self {
            InstallError::Config(_) => 2,
            InstallError::NoHome => 3,
            InstallError::BinDir { .. } => 10,
            InstallError::RemoveStale { .. } => 11,
            InstallError::Download { .. } => 12,
            InstallError::Checksum { .. } => 13,
            InstallError::Permissions { .. } => 14,
            InstallError::Profile { .. } => 15,
            InstallError::SmokeTest { .. } => 16,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("writing body")]
    Io(#[from] io::Error),

    #[error("transfer truncated: expected {expected} bytes, received {received}")]
    Truncated { expected: u64, received: u64 },
}

/// Exit code for an error bubbling out of a command handler.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<InstallError>())
        .map(InstallError::exit_code)
        .unwrap_or(1)
}
