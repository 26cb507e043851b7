//! ffmpeg-backed compositor.
//!
//! All muxing and probing runs through the `ffmpeg`/`ffprobe` binaries as
//! blocking subprocesses. Filter graphs are built as strings by small pure
//! functions so the wiring stays testable without the binaries installed.

use super::{Resolution, VideoCompositor};
use crate::error::{RelatoError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Extensions classified as video containers when splitting mixed input lists.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];
/// Extensions classified as audio-only inputs.
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "aac", "m4a"];

/// Seconds of fade-out applied to the tail of a mixed-in music track.
const MUSIC_FADE_SECONDS: f64 = 5.0;

/// Compositor that shells out to ffmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegCompositor;

impl FfmpegCompositor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VideoCompositor for FfmpegCompositor {
    #[instrument(skip(self, clips), fields(clips = clips.len()))]
    async fn join_silent_videos(
        &self,
        clips: &[PathBuf],
        resolution: Resolution,
        fps: u32,
        output: &Path,
    ) -> Result<PathBuf> {
        if clips.is_empty() {
            return Err(RelatoError::InvalidInput("no clips to join".into()));
        }

        let mut args = Vec::new();
        for clip in clips {
            args.push("-i".to_string());
            args.push(clip.display().to_string());
        }
        args.extend([
            "-filter_complex".to_string(),
            silent_concat_filter(clips.len(), resolution, fps),
            "-map".to_string(),
            "[outv]".to_string(),
            "-an".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ]);

        run_ffmpeg(&args).await?;
        Ok(output.to_path_buf())
    }

    #[instrument(skip(self, media), fields(inputs = media.len()))]
    async fn join_video_with_audio(
        &self,
        media: &[PathBuf],
        resolution: Resolution,
        output: &Path,
    ) -> Result<PathBuf> {
        let (videos, audios) = split_media_inputs(media);
        if videos.is_empty() {
            return Err(RelatoError::InvalidInput("no video input to join".into()));
        }
        if audios.is_empty() {
            return Err(RelatoError::InvalidInput("no audio input to join".into()));
        }

        // ffmpeg input order: all videos first, then all audio files.
        let mut args = Vec::new();
        for path in videos.iter().chain(audios.iter()) {
            args.push("-i".to_string());
            args.push(path.display().to_string());
        }
        args.extend([
            "-filter_complex".to_string(),
            av_concat_filter(videos.len(), audios.len(), resolution),
            "-map".to_string(),
            "[outv]".to_string(),
            "-map".to_string(),
            "[outa]".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ]);

        run_ffmpeg(&args).await?;
        Ok(output.to_path_buf())
    }

    #[instrument(skip(self))]
    async fn burn_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        output: &Path,
    ) -> Result<PathBuf> {
        if !subtitles.exists() {
            return Err(RelatoError::Subtitles(format!(
                "subtitle file not found: {}",
                subtitles.display()
            )));
        }

        // The subtitles filter parses its argument, so backslashes must go.
        let subtitle_arg = subtitles.display().to_string().replace('\\', "/");

        let args = vec![
            "-i".to_string(),
            video.display().to_string(),
            "-vf".to_string(),
            format!("subtitles={}", subtitle_arg),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ];

        run_ffmpeg(&args).await?;
        Ok(output.to_path_buf())
    }

    #[instrument(skip(self))]
    async fn mix_audio_into_video(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        volume: f32,
    ) -> Result<PathBuf> {
        let video_probe = probe(video).await?;
        if !has_audio_stream(&video_probe) {
            return Err(RelatoError::Composition(format!(
                "video input has no audio stream: {}",
                video.display()
            )));
        }

        let audio_probe = probe(audio).await?;
        if !has_audio_stream(&audio_probe) {
            return Err(RelatoError::Composition(format!(
                "additional audio input is not valid: {}",
                audio.display()
            )));
        }

        let duration = duration_of(&video_probe, video)?;

        let args = vec![
            "-i".to_string(),
            video.display().to_string(),
            "-i".to_string(),
            audio.display().to_string(),
            "-filter_complex".to_string(),
            music_mix_filter(duration, volume),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "[outa]".to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ];

        run_ffmpeg(&args).await?;
        Ok(output.to_path_buf())
    }

    async fn media_duration(&self, path: &Path) -> Result<f64> {
        probe_duration(path).await
    }
}

/// Scale and fps-normalize each clip, then concat the video streams only.
fn silent_concat_filter(count: usize, resolution: Resolution, fps: u32) -> String {
    let mut filter = String::new();
    for i in 0..count {
        filter.push_str(&format!(
            "[{i}:v]fps={fps},scale={w}:{h},setsar=1[v{i}];",
            w = resolution.width,
            h = resolution.height,
        ));
    }
    for i in 0..count {
        filter.push_str(&format!("[v{i}]"));
    }
    filter.push_str(&format!("concat=n={count}:v=1:a=0[outv]"));
    filter
}

/// Concat scaled video streams and resampled audio streams separately.
///
/// Audio inputs follow the video inputs in ffmpeg's input list, so their
/// stream selectors start at `video_count`.
fn av_concat_filter(video_count: usize, audio_count: usize, resolution: Resolution) -> String {
    let mut filter = String::new();
    for i in 0..video_count {
        filter.push_str(&format!(
            "[{i}:v]scale={w}:{h},setsar=1[v{i}];",
            w = resolution.width,
            h = resolution.height,
        ));
    }
    for j in 0..audio_count {
        filter.push_str(&format!(
            "[{idx}:a]aresample=48000,asetpts=PTS-STARTPTS[a{j}];",
            idx = video_count + j,
        ));
    }
    for i in 0..video_count {
        filter.push_str(&format!("[v{i}]"));
    }
    filter.push_str(&format!("concat=n={video_count}:v=1:a=0[outv];"));
    for j in 0..audio_count {
        filter.push_str(&format!("[a{j}]"));
    }
    filter.push_str(&format!("concat=n={audio_count}:v=0:a=1[outa]"));
    filter
}

/// Trim the music to the video length, lower it, fade the tail, and mix it
/// under the existing audio.
fn music_mix_filter(video_duration: f64, volume: f32) -> String {
    let fade = MUSIC_FADE_SECONDS.min(video_duration);
    let fade_start = (video_duration - fade).max(0.0);
    format!(
        "[1:a]atrim=duration={video_duration:.3},volume={volume},\
         afade=t=out:st={fade_start:.3}:d={fade:.3}[music];\
         [0:a][music]amix=inputs=2:duration=first[outa]"
    )
}

/// Split a mixed input list into (videos, audios) by extension.
fn split_media_inputs(media: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut videos = Vec::new();
    let mut audios = Vec::new();
    for path in media {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            videos.push(path.clone());
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            audios.push(path.clone());
        }
    }
    (videos, audios)
}

/// Run ffmpeg with the given arguments, capturing stderr for error reporting.
pub(crate) async fn run_ffmpeg(args: &[String]) -> Result<()> {
    debug!("ffmpeg {}", args.join(" "));

    let result = Command::new("ffmpeg")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr);
            Err(RelatoError::ToolFailed(format!(
                "ffmpeg: {}",
                last_lines(&stderr, 4)
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RelatoError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(RelatoError::Composition(format!("ffmpeg error: {e}"))),
    }
}

/// ffprobe a media file and return its parsed JSON description.
async fn probe(path: &Path) -> Result<serde_json::Value> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg("-show_streams")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RelatoError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(RelatoError::Composition(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(RelatoError::Composition(format!(
            "ffprobe returned error for {}",
            path.display()
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&json_str)
        .map_err(|_| RelatoError::Composition("Invalid ffprobe output".into()))
}

/// Duration of a media file in seconds.
pub(crate) async fn probe_duration(path: &Path) -> Result<f64> {
    let parsed = probe(path).await?;
    duration_of(&parsed, path)
}

fn duration_of(parsed: &serde_json::Value, path: &Path) -> Result<f64> {
    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            RelatoError::Composition(format!(
                "could not determine duration of {}",
                path.display()
            ))
        })
}

fn has_audio_stream(parsed: &serde_json::Value) -> bool {
    parsed["streams"]
        .as_array()
        .is_some_and(|streams| {
            streams
                .iter()
                .any(|s| s["codec_type"].as_str() == Some("audio"))
        })
}

/// Keep only the last `n` lines of tool output for error messages.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_concat_filter() {
        let filter = silent_concat_filter(2, Resolution::HORIZONTAL, 30);
        assert_eq!(
            filter,
            "[0:v]fps=30,scale=1280:720,setsar=1[v0];\
             [1:v]fps=30,scale=1280:720,setsar=1[v1];\
             [v0][v1]concat=n=2:v=1:a=0[outv]"
        );
    }

    #[test]
    fn test_av_concat_filter_selectors() {
        let filter = av_concat_filter(1, 2, Resolution::HORIZONTAL);
        // Audio selectors start after the video inputs.
        assert!(filter.contains("[1:a]aresample=48000"));
        assert!(filter.contains("[2:a]aresample=48000"));
        assert!(filter.contains("concat=n=1:v=1:a=0[outv]"));
        assert!(filter.contains("[a0][a1]concat=n=2:v=0:a=1[outa]"));
    }

    #[test]
    fn test_music_mix_filter() {
        let filter = music_mix_filter(60.0, 0.3);
        assert!(filter.contains("atrim=duration=60.000"));
        assert!(filter.contains("volume=0.3"));
        assert!(filter.contains("afade=t=out:st=55.000:d=5.000"));
        assert!(filter.contains("amix=inputs=2:duration=first"));
    }

    #[test]
    fn test_music_mix_filter_short_video() {
        // Fade never starts before zero on clips shorter than the fade.
        let filter = music_mix_filter(3.0, 0.5);
        assert!(filter.contains("afade=t=out:st=0.000:d=3.000"));
    }

    #[test]
    fn test_split_media_inputs() {
        let media = vec![
            PathBuf::from("a.mp4"),
            PathBuf::from("b.MP3"),
            PathBuf::from("c.mov"),
            PathBuf::from("notes.txt"),
        ];
        let (videos, audios) = split_media_inputs(&media);
        assert_eq!(videos, vec![PathBuf::from("a.mp4"), PathBuf::from("c.mov")]);
        assert_eq!(audios, vec![PathBuf::from("b.MP3")]);
    }

    #[test]
    fn test_has_audio_stream() {
        let parsed: serde_json::Value = serde_json::json!({
            "streams": [
                {"codec_type": "video"},
                {"codec_type": "audio"}
            ]
        });
        assert!(has_audio_stream(&parsed));

        let silent: serde_json::Value = serde_json::json!({
            "streams": [{"codec_type": "video"}]
        });
        assert!(!has_audio_stream(&silent));
    }
}
