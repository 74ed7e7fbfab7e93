use crate::platform::PlatformOps;
use std::io;
use std::path::{Path, PathBuf};

pub static WINDOWS_PLATFORM: Windows = Windows;

pub struct Windows;

impl PlatformOps for Windows {
    fn home_dir(&self) -> Option<PathBuf> {
        std::env::var_os("USERPROFILE")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
    }

    fn final_binary_name(&self, base: &str) -> String {
        if base.ends_with(".exe") {
            base.to_string()
        } else {
            format!("{base}.exe")
        }
    }

    // Executability comes from the extension; only check the file exists.
    fn make_executable(&self, path: &Path) -> io::Result<()> {
        fs_err::metadata(path).map(|_| ())
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}
