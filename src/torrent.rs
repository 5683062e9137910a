//! Torrent record and file download

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::{Error, Result};

/// One torrent listing, progressively enriched from the search listing and
/// then the detail page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TorrentRecord {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub hash: Option<String>,
    pub uploader: Option<String>,
    pub uploader_profile: Option<String>,
    pub size: Option<String>,
    pub age: Option<String>,
    pub ratio: Option<String>,
    pub tags: Option<String>,
    pub resolution: Option<String>,
    pub seeders: Option<u32>,
    pub leechers: Option<u32>,
    pub completed: Option<u32>,
    pub comments: Option<u32>,
    pub discounts: Option<String>,
    pub fastline_credit_url: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub languages: Option<String>,
    pub three_d: Option<bool>,
    pub download_link: Option<String>,
    pub downloaded: bool,
    pub downloaded_path: Option<PathBuf>,
}

impl TorrentRecord {
    /// Record known only by its detail-page URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// File name used for the downloaded `.torrent`
    fn file_name(&self) -> String {
        let title = self.title.as_deref().unwrap_or("torrent");
        let safe: String = title
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        format!("{}.torrent", safe.trim())
    }

    /// Download the `.torrent` file into `dir` as `{title}.torrent`.
    ///
    /// The download state is only mutated once the file is on disk; a
    /// failed fetch leaves the record untouched.
    pub fn download(&mut self, client: &Client, dir: &Path) -> Result<()> {
        let link = self
            .download_link
            .as_deref()
            .ok_or_else(|| Error::Download("no download link".to_string()))?;

        fs::create_dir_all(dir)
            .map_err(|e| Error::Download(format!("cannot create `{}`: {}", dir.display(), e)))?;

        let response = client
            .get(link)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Download(format!("fetch of `{}` failed: {}", link, e)))?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::Download(format!("fetch of `{}` failed: {}", link, e)))?;
        if bytes.is_empty() {
            return Err(Error::Download(format!("fetch of `{}` returned no data", link)));
        }

        let path = dir.join(self.file_name());
        fs::write(&path, &bytes)
            .map_err(|e| Error::Download(format!("cannot write `{}`: {}", path.display(), e)))?;

        self.downloaded = true;
        self.downloaded_path = Some(path);
        Ok(())
    }

    /// Remove the downloaded file and reset the download state.
    ///
    /// A no-op when nothing was downloaded; an error when the recorded
    /// file has gone missing since.
    pub fn delete(&mut self) -> Result<()> {
        if !self.downloaded {
            return Ok(());
        }
        let path = match &self.downloaded_path {
            Some(path) => path.clone(),
            None => {
                self.downloaded = false;
                return Ok(());
            }
        };
        if !path.exists() {
            return Err(Error::Download(format!("downloaded file not found: `{}`", path.display())));
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Download(format!("cannot remove `{}`: {}", path.display(), e)))?;

        self.downloaded = false;
        self.downloaded_path = None;
        Ok(())
    }
}

/// Blocking HTTP client with the headers the site expects.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .build()
        .map_err(|e| Error::Configuration(format!("cannot build http client: {}", e)))
}
