//! HTTP fetching and archive extraction for dataset payloads.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::info;
use url::Url;

/// HTTP client for dataset downloads.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("recenso/0.1 (census dataset ingest)")
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch a small text payload into memory.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?;
        resp.text().await.context("Failed to read response body")
    }

    /// Download `url` into `dest_dir`, keeping the remote file name. An
    /// already-present file is reused without a network round trip.
    pub async fn download_file(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("create dir {}", dest_dir.display()))?;

        let fname = remote_file_name(url)?;
        let target = dest_dir.join(&fname);
        if target.exists() {
            info!("File already exists: {}", target.display());
            return Ok(target);
        }

        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?;

        let pb = match resp.content_length() {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})")?
                .progress_chars("#>-"),
        );

        // Stream through a temp file so an interrupted download never leaves
        // a half-written target behind.
        let mut tmp = tempfile::NamedTempFile::new_in(dest_dir).context("create temp file")?;
        while let Some(chunk) = resp.chunk().await? {
            tmp.write_all(&chunk)?;
            pb.inc(chunk.len() as u64);
        }
        pb.finish();
        tmp.persist(&target)
            .with_context(|| format!("rename to {}", target.display()))?;

        Ok(target)
    }
}

/// File name component of a URL path.
fn remote_file_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("invalid URL {url}"))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .with_context(|| format!("URL has no file name: {url}"))
}

/// Extract a zip archive into `dest`.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file).context("Failed to read zip archive")?;
    zip.extract(dest)
        .with_context(|| format!("extract into {}", dest.display()))?;
    info!(
        "Extracted {} entries from {}",
        zip.len(),
        archive.display()
    );
    Ok(())
}
