//! Video composition abstraction for Relato.
//!
//! Defines the compositor contract the toolkit delegates to, plus the
//! ffmpeg-backed implementation used outside of tests.

mod ffmpeg;

pub use ffmpeg::FfmpegCompositor;
pub(crate) use ffmpeg::{probe_duration, run_ffmpeg};

use crate::error::{RelatoError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output frame size, rendered as `WIDTHxHEIGHT` wherever ffmpeg expects one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Long-form (landscape) output.
    pub const HORIZONTAL: Resolution = Resolution { width: 1280, height: 720 };
    /// Short-form (portrait) output.
    pub const VERTICAL: Resolution = Resolution { width: 720, height: 1280 };
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Resolution {
    type Err = RelatoError;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| RelatoError::InvalidInput(format!("invalid resolution: {}", s)))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| RelatoError::InvalidInput(format!("invalid resolution width: {}", s)))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| RelatoError::InvalidInput(format!("invalid resolution height: {}", s)))?;
        Ok(Resolution { width, height })
    }
}

/// Trait for video composition backends.
///
/// Every method blocks until the external muxer finishes and returns the
/// path of the produced file; callers own cleanup of inputs and outputs.
#[async_trait]
pub trait VideoCompositor: Send + Sync {
    /// Concatenate video-only clips, scaling them to a common resolution.
    async fn join_silent_videos(
        &self,
        clips: &[PathBuf],
        resolution: Resolution,
        fps: u32,
        output: &Path,
    ) -> Result<PathBuf>;

    /// Combine video inputs with one or more audio inputs into a single file.
    ///
    /// Inputs are classified by extension; video streams are scaled and
    /// concatenated, audio streams are normalized and concatenated.
    async fn join_video_with_audio(
        &self,
        media: &[PathBuf],
        resolution: Resolution,
        output: &Path,
    ) -> Result<PathBuf>;

    /// Burn a subtitle file into the video frames.
    async fn burn_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        output: &Path,
    ) -> Result<PathBuf>;

    /// Overlay a secondary audio track at reduced volume onto a video's
    /// existing audio. Fails if either input lacks a valid audio stream.
    async fn mix_audio_into_video(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        volume: f32,
    ) -> Result<PathBuf>;

    /// Duration of a media file in seconds, from the decoded container.
    async fn media_duration(&self, path: &Path) -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_display() {
        assert_eq!(Resolution::HORIZONTAL.to_string(), "1280x720");
        assert_eq!(Resolution::VERTICAL.to_string(), "720x1280");
    }

    #[test]
    fn test_resolution_parse() {
        let res: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(res, Resolution { width: 1920, height: 1080 });
        assert!("1920".parse::<Resolution>().is_err());
        assert!("wxh".parse::<Resolution>().is_err());
    }
}
