pub fn platform() -> &'static dyn PlatformOps {
    &ConcretePlatform
}

use std::io;
use std::path::{Path, PathBuf};

pub trait PlatformOps: Sync + Send {
    fn home_dir(&self) -> Option<PathBuf>;
    /// Directory user-installed executables go into.
    fn bin_dir(&self, home: &Path) -> PathBuf {
        home.join("bin")
    }
    fn final_binary_name(&self, base: &str) -> String;
    /// Adds execute permission, keeping whatever bits are already set.
    fn make_executable(&self, path: &Path) -> io::Result<()>;
    fn is_executable(&self, path: &Path) -> bool;
}

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::UNIX_PLATFORM as ConcretePlatform;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WINDOWS_PLATFORM as ConcretePlatform;
