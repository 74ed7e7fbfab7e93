use crate::error::{DownloadError, InstallError};
use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use sha2::{Digest, Sha256};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: u64,
    pub sha256: String,
}

pub fn build_client(timeout: Duration, connect_timeout: Duration) -> Result<Client, InstallError> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| InstallError::Config(format!("building HTTP client: {e}")))
}

/// Stream `url` into `dest`, hashing as it goes. The file is flushed and
/// closed before this returns. A failed transfer leaves whatever was written.
pub fn download_to(client: &Client, url: &str, dest: &Path) -> Result<Downloaded, InstallError> {
    fetch(client, url, dest).map_err(|source| InstallError::Download {
        url: url.to_string(),
        source,
    })
}

fn fetch(client: &Client, url: &str, dest: &Path) -> Result<Downloaded, DownloadError> {
    let mut resp = client.get(url).send()?;
    debug!(final_url = %resp.url(), status = %resp.status(), "response");
    if !resp.status().is_success() {
        return Err(DownloadError::Status(resp.status()));
    }
    let expected = resp.content_length();

    let pb = progress_bar(expected);
    let file = fs::File::create(dest)?;
    let mut writer = HashingWriter::new(file).with_progress(pb.clone());
    let copied = resp.copy_to(&mut writer);
    pb.finish_and_clear();
    let received = match (copied, expected) {
        (Ok(n), _) => n,
        // hyper reports a body that ends before Content-Length as a body error.
        (Err(e), Some(expected)) if e.is_body() && !e.is_timeout() && writer.written < expected => {
            debug!(error = %e, "body ended early");
            return Err(DownloadError::Truncated {
                expected,
                received: writer.written,
            });
        }
        (Err(e), _) => return Err(e.into()),
    };
    writer.flush()?;

    if let Some(expected) = expected {
        if received != expected {
            return Err(DownloadError::Truncated { expected, received });
        }
    }
    Ok(Downloaded {
        bytes: received,
        sha256: writer.finish(),
    })
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(n) => {
            let pb = ProgressBar::new(n);
            if let Ok(style) =
                ProgressStyle::with_template("{bar:30} {bytes}/{total_bytes} {bytes_per_sec}")
            {
                pb.set_style(style);
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner} {bytes} {bytes_per_sec}") {
                pb.set_style(style);
            }
            pb
        }
    }
}

pub fn verify_sha256(url: &str, actual: &str, expected: &str) -> Result<(), InstallError> {
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(InstallError::Checksum {
            url: url.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut hasher = HashingWriter::new(io::sink());
    io::copy(&mut fs::File::open(path)?, &mut hasher)?;
    Ok(hasher.finish())
}

struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    written: u64,
    progress: Option<ProgressBar>,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            written: 0,
            progress: None,
        }
    }

    fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        if let Some(pb) = &self.progress {
            pb.inc(n as u64);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
