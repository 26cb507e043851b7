//! Pexels video search and download client.

use crate::error::{RelatoError, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

const SEARCH_URL: &str = "https://api.pexels.com/videos/search";

/// Thin client for the Pexels video API.
pub struct PexelsClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
    #[serde(default)]
    videos: Vec<StockVideo>,
}

/// One searchable stock video.
#[derive(Debug, Clone, Deserialize)]
pub struct StockVideo {
    pub id: u64,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub video_files: Vec<StockVideoFile>,
}

/// One downloadable rendition of a stock video.
#[derive(Debug, Clone, Deserialize)]
pub struct StockVideoFile {
    pub link: String,
    pub quality: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl StockVideo {
    /// First listed rendition (the smallest one, which downloads fastest).
    pub fn download_url(&self) -> Option<&str> {
        self.video_files.first().map(|f| f.link.as_str())
    }
}

impl PexelsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Search stock videos for a query, one result page at a time.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, per_page: usize, page: usize) -> Result<Vec<StockVideo>> {
        let response = self
            .http
            .get(SEARCH_URL)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", &per_page.to_string()),
                ("page", &page.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelatoError::Footage(format!(
                "Pexels search failed ({}): {}",
                status, body
            )));
        }

        let parsed: VideoSearchResponse = response.json().await?;
        debug!("Found {} videos on page {}", parsed.videos.len(), page);
        Ok(parsed.videos)
    }

    /// Stream a video file to disk.
    #[instrument(skip(self, url))]
    pub async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(RelatoError::Footage(format!(
                "Download failed ({}): {}",
                response.status(),
                url
            )));
        }

        let pb = match response.content_length() {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => ProgressBar::hidden(),
        };

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        pb.finish_and_clear();

        Ok(dest.to_path_buf())
    }
}
