//! Shell profile handling: which startup file to touch and which line puts
//! `~/bin` on PATH for that shell.

use fs_err as fs;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Pick the shell from a `$SHELL` value, falling back to bash.
    pub fn detect(shell_var: Option<&OsStr>) -> Self {
        let name = shell_var
            .map(Path::new)
            .and_then(Path::file_name)
            .and_then(OsStr::to_str)
            .unwrap_or("");
        match name {
            "zsh" => ShellKind::Zsh,
            "fish" => ShellKind::Fish,
            _ => ShellKind::Bash,
        }
    }

    pub fn profile_path(self, home: &Path) -> PathBuf {
        match self {
            ShellKind::Bash => home.join(".bashrc"),
            ShellKind::Zsh => home.join(".zshrc"),
            ShellKind::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    pub fn export_line(self) -> &'static str {
        match self {
            ShellKind::Bash | ShellKind::Zsh => r#"export PATH="$HOME/bin:$PATH""#,
            ShellKind::Fish => r#"set -gx PATH "$HOME/bin" $PATH"#,
        }
    }
}

/// How to decide whether a profile already puts the binary directory on PATH.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMatch {
    /// The exact export line must appear somewhere in the file.
    #[default]
    Literal,
    /// Any PATH assignment mentioning the binary directory counts.
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    AlreadyPresent,
    Appended,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ShellProfile {
    pub kind: ShellKind,
    pub path: PathBuf,
    pub line: &'static str,
}

static PATH_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+PATH\s*=|PATH\s*=|set\s+(?:-[A-Za-z]+\s+)*PATH\s|fish_add_path\s)",
    )
    .expect("PATH assignment pattern")
});

impl ShellProfile {
    pub fn for_shell(kind: ShellKind, home: &Path) -> Self {
        Self {
            kind,
            path: kind.profile_path(home),
            line: kind.export_line(),
        }
    }

    pub fn contains_export(&self, contents: &str, mode: ProfileMatch, bin_dir: &Path) -> bool {
        match mode {
            ProfileMatch::Literal => contents.contains(self.line),
            ProfileMatch::Semantic => {
                contents.contains(self.line) || mentions_bin_dir_on_path(contents, bin_dir)
            }
        }
    }

    /// Profile contents, with a missing file reading as empty.
    pub fn read(&self) -> io::Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    /// Append the export line unless the profile already has it.
    pub fn ensure_export(&self, mode: ProfileMatch, bin_dir: &Path) -> io::Result<ProfileUpdate> {
        let existing = self.read()?;
        if self.contains_export(&existing, mode, bin_dir) {
            return Ok(ProfileUpdate::AlreadyPresent);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            f.write_all(b"\n")?;
        }
        f.write_all(self.line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(ProfileUpdate::Appended)
    }

    /// Drop every line equal to the export line. Returns whether anything changed.
    /// Other lines keep their original endings.
    pub fn remove_export(&self) -> io::Result<bool> {
        let existing = self.read()?;
        let is_export = |l: &str| l.trim_end() == self.line;
        if !existing.lines().any(is_export) {
            return Ok(false);
        }
        let kept: String = existing
            .split_inclusive('\n')
            .filter(|l| !is_export(*l))
            .collect();
        fs::write(&self.path, kept)?;
        Ok(true)
    }
}

fn mentions_bin_dir_on_path(contents: &str, bin_dir: &Path) -> bool {
    let absolute = bin_dir.to_string_lossy();
    let spellings = ["$HOME/bin", "${HOME}/bin", "~/bin", absolute.as_ref()];
    contents
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .filter(|l| PATH_ASSIGNMENT.is_match(l))
        .any(|l| spellings.iter().any(|s| !s.is_empty() && mentions_dir(l, s)))
}

/// `dir` must be a whole PATH entry: followed by a separator, a quote, or
/// the end of the line, optionally after one trailing slash.
fn mentions_dir(line: &str, dir: &str) -> bool {
    let ends_entry = |rest: &str| match rest.chars().next() {
        None => true,
        Some(c) => c == ':' || c == '"' || c == '\'' || c.is_whitespace(),
    };
    line.match_indices(dir).any(|(idx, _)| {
        let rest = &line[idx + dir.len()..];
        ends_entry(rest) || rest.strip_prefix('/').is_some_and(ends_entry)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_in(home: &Path, kind: ShellKind) -> ShellProfile {
        ShellProfile::for_shell(kind, home)
    }

    #[test]
    fn detects_shell_from_shell_var() {
        assert_eq!(ShellKind::detect(Some(OsStr::new("/usr/bin/zsh"))), ShellKind::Zsh);
        assert_eq!(
            ShellKind::detect(Some(OsStr::new("/opt/homebrew/bin/fish"))),
            ShellKind::Fish
        );
        assert_eq!(ShellKind::detect(Some(OsStr::new("/bin/bash"))), ShellKind::Bash);
        assert_eq!(ShellKind::detect(Some(OsStr::new("/bin/tcsh"))), ShellKind::Bash);
        assert_eq!(ShellKind::detect(None), ShellKind::Bash);
    }

    #[test]
    fn bash_profile_uses_exact_line() {
        let p = profile_in(Path::new("/home/u"), ShellKind::Bash);
        assert_eq!(p.path, PathBuf::from("/home/u/.bashrc"));
        assert_eq!(p.line, "export PATH=\"$HOME/bin:$PATH\"");
    }

    #[test]
    fn appends_once_to_missing_profile() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        let bin = home.path().join("bin");

        assert_eq!(
            p.ensure_export(ProfileMatch::Literal, &bin).unwrap(),
            ProfileUpdate::Appended
        );
        assert_eq!(
            p.ensure_export(ProfileMatch::Literal, &bin).unwrap(),
            ProfileUpdate::AlreadyPresent
        );

        let contents = std::fs::read_to_string(&p.path).unwrap();
        assert_eq!(contents, "export PATH=\"$HOME/bin:$PATH\"\n");
    }

    #[test]
    fn existing_exact_line_adds_nothing() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        let original = "alias ll='ls -l'\nexport PATH=\"$HOME/bin:$PATH\"\n# end\n";
        std::fs::write(&p.path, original).unwrap();

        let update = p.ensure_export(ProfileMatch::Literal, &home.path().join("bin")).unwrap();

        assert_eq!(update, ProfileUpdate::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&p.path).unwrap(), original);
    }

    #[test]
    fn literal_mode_misses_reformatted_export() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        std::fs::write(&p.path, "export PATH=$HOME/bin:$PATH").unwrap();

        let update = p.ensure_export(ProfileMatch::Literal, &home.path().join("bin")).unwrap();

        assert_eq!(update, ProfileUpdate::Appended);
        assert_eq!(
            std::fs::read_to_string(&p.path).unwrap(),
            "export PATH=$HOME/bin:$PATH\nexport PATH=\"$HOME/bin:$PATH\"\n"
        );
    }

    #[test]
    fn semantic_mode_recognises_equivalent_exports() {
        let bin = Path::new("/home/u/bin");
        let p = profile_in(Path::new("/home/u"), ShellKind::Bash);
        for contents in [
            "export PATH=$HOME/bin:$PATH\n",
            "export PATH=\"${HOME}/bin:$PATH\"\n",
            "PATH=~/bin:$PATH\n",
            "export PATH=\"$PATH:/home/u/bin\"\n",
            "export PATH=$HOME/bin/:$PATH\n",
            "fish_add_path ~/bin\n",
        ] {
            assert!(p.contains_export(contents, ProfileMatch::Semantic, bin), "{contents}");
            assert!(!p.contains_export(contents, ProfileMatch::Literal, bin), "{contents}");
        }
    }

    #[test]
    fn semantic_mode_ignores_comments_and_other_dirs() {
        let bin = Path::new("/home/u/bin");
        let p = profile_in(Path::new("/home/u"), ShellKind::Bash);
        for contents in [
            "# export PATH=$HOME/bin:$PATH\n",
            "export PATH=$HOME/binaries:$PATH\n",
            "export PATH=\"$HOME/bin/scripts:$PATH\"\n",
            "PATH=/home/u/bin/local:$PATH\n",
            "echo $HOME/bin\n",
        ] {
            assert!(!p.contains_export(contents, ProfileMatch::Semantic, bin), "{contents}");
        }
    }

    #[test]
    fn fish_profile_creates_parent_dir() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Fish);

        p.ensure_export(ProfileMatch::Literal, &home.path().join("bin")).unwrap();

        let contents =
            std::fs::read_to_string(home.path().join(".config/fish/config.fish")).unwrap();
        assert_eq!(contents, "set -gx PATH \"$HOME/bin\" $PATH\n");
        let bin = home.path().join("bin");
        assert!(p.contains_export("fish_add_path $HOME/bin\n", ProfileMatch::Semantic, &bin));
    }

    #[test]
    fn appended_line_starts_on_its_own_line() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Zsh);
        std::fs::write(&p.path, "setopt autocd").unwrap();

        p.ensure_export(ProfileMatch::Literal, &home.path().join("bin")).unwrap();

        assert_eq!(
            std::fs::read_to_string(&p.path).unwrap(),
            "setopt autocd\nexport PATH=\"$HOME/bin:$PATH\"\n"
        );
    }

    #[test]
    fn remove_export_strips_only_the_export_line() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        std::fs::write(&p.path, "a\nexport PATH=\"$HOME/bin:$PATH\"\nb\n").unwrap();

        assert!(p.remove_export().unwrap());
        assert_eq!(std::fs::read_to_string(&p.path).unwrap(), "a\nb\n");
        assert!(!p.remove_export().unwrap());
    }

    #[test]
    fn remove_export_leaves_embedded_mentions_untouched() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        let original = "# was: export PATH=\"$HOME/bin:$PATH\" (old)";
        std::fs::write(&p.path, original).unwrap();

        assert!(!p.remove_export().unwrap());
        assert_eq!(std::fs::read_to_string(&p.path).unwrap(), original);
    }

    #[test]
    fn remove_export_keeps_crlf_endings() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        std::fs::write(&p.path, "a\r\nexport PATH=\"$HOME/bin:$PATH\"\r\nb\r\nc").unwrap();

        assert!(p.remove_export().unwrap());
        assert_eq!(std::fs::read_to_string(&p.path).unwrap(), "a\r\nb\r\nc");
    }

    #[test]
    fn remove_export_on_missing_profile_is_noop() {
        let home = tempfile::tempdir().unwrap();
        let p = profile_in(home.path(), ShellKind::Bash);
        assert!(!p.remove_export().unwrap());
        assert!(!p.path.exists());
    }
}
