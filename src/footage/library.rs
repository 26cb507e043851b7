//! Local clip library: downloaded stock footage plus a JSON metadata index.

use super::PexelsClient;
use crate::error::{RelatoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, instrument};
use url::Url;

const INDEX_FILE: &str = "clips.json";

/// Consecutive result pages with no usable clip before giving up.
const MAX_EMPTY_PAGES: u32 = 5;

/// Metadata for one downloaded clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRecord {
    pub id: u64,
    pub query: String,
    pub file_name: String,
    pub url: String,
    pub downloaded_at: DateTime<Utc>,
}

/// Clip cache rooted at a library directory, one subdirectory per query.
pub struct FootageLibrary {
    root: PathBuf,
    index: Vec<ClipRecord>,
    client: PexelsClient,
}

impl FootageLibrary {
    /// Open (or initialize) a library at `root`.
    pub fn open(root: impl Into<PathBuf>, client: PexelsClient) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let content = std::fs::read_to_string(&index_path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        Ok(Self { root, index, client })
    }

    /// Ensure `count` clips exist locally for `query`, downloading as needed.
    ///
    /// Previously downloaded clips are reused; new ones are fetched from
    /// successive result pages until the count is met.
    #[instrument(skip(self))]
    pub async fn fetch(&mut self, query: &str, count: usize) -> Result<Vec<PathBuf>> {
        let dir = self.query_dir(query);
        std::fs::create_dir_all(&dir)?;

        let mut clips = Vec::new();
        let mut have = std::collections::HashSet::new();
        for record in self.index.iter().filter(|r| r.query == query) {
            if clips.len() >= count {
                break;
            }
            let path = dir.join(&record.file_name);
            if path.exists() {
                debug!("Reusing cached clip {}", path.display());
                have.insert(record.id);
                clips.push(path);
            }
        }

        let mut page = 1;
        let mut empty_pages = 0;
        while clips.len() < count {
            let videos = self.client.search(query, count, page).await?;
            let mut added = 0;

            for video in videos {
                if clips.len() >= count {
                    break;
                }
                if have.contains(&video.id) {
                    continue;
                }

                let url = video.download_url().ok_or_else(|| {
                    RelatoError::Footage(format!("video {} has no downloadable files", video.id))
                })?;

                let file_name = clip_file_name(video.id, query, url, Utc::now());
                let dest = dir.join(&file_name);
                self.client.download(url, &dest).await?;

                // Replace any stale record whose file went missing.
                self.index
                    .retain(|r| !(r.query == query && r.id == video.id));
                self.index.push(ClipRecord {
                    id: video.id,
                    query: query.to_string(),
                    file_name,
                    url: url.to_string(),
                    downloaded_at: Utc::now(),
                });
                self.save_index()?;

                info!("Downloaded clip {}", dest.display());
                have.insert(video.id);
                clips.push(dest);
                added += 1;
            }

            if added == 0 {
                empty_pages += 1;
                if empty_pages >= MAX_EMPTY_PAGES {
                    return Err(RelatoError::Footage(format!(
                        "only {} of {} clips available for '{}'",
                        clips.len(),
                        count,
                        query
                    )));
                }
            } else {
                empty_pages = 0;
            }
            page += 1;
        }

        Ok(clips)
    }

    /// All records currently in the index.
    pub fn records(&self) -> &[ClipRecord] {
        &self.index
    }

    fn query_dir(&self, query: &str) -> PathBuf {
        self.root.join(query.trim().replace(' ', "_"))
    }

    fn save_index(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.index)?;
        std::fs::write(self.root.join(INDEX_FILE), content)?;
        Ok(())
    }
}

/// `YYYYMMDD_HHMMSS_<id>_<query>.<ext>` clip file name.
fn clip_file_name(id: u64, query: &str, url: &str, at: DateTime<Utc>) -> String {
    let timestamp = at.format("%Y%m%d_%H%M%S");
    let query_part = query.trim().replace(' ', "_");
    format!("{timestamp}_{id}_{query_part}.{}", extension_from_url(url))
}

/// File extension from a download URL, ignoring query strings.
fn extension_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .last()?
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
        })
        .unwrap_or_else(|| "mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clip_file_name() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let name = clip_file_name(42, "deep space", "https://videos.example.com/a/clip.mp4?x=1", at);
        assert_eq!(name, "20250314_092653_42_deep_space.mp4");
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://e.com/v/file.mov?dl=1"), "mov");
        assert_eq!(extension_from_url("https://e.com/v/file"), "mp4");
        assert_eq!(extension_from_url("not a url"), "mp4");
    }

    #[test]
    fn test_index_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let client = PexelsClient::new("test-key");
        let mut library = FootageLibrary::open(dir.path(), client).unwrap();
        library.index.push(ClipRecord {
            id: 7,
            query: "food".to_string(),
            file_name: "20250101_000000_7_food.mp4".to_string(),
            url: "https://e.com/7.mp4".to_string(),
            downloaded_at: Utc::now(),
        });
        library.save_index().unwrap();

        let reopened = FootageLibrary::open(dir.path(), PexelsClient::new("test-key")).unwrap();
        assert_eq!(reopened.records().len(), 1);
        assert_eq!(reopened.records()[0].id, 7);
    }
}
