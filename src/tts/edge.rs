//! Edge TTS synthesis via the `edge-tts` command-line tool.

use super::{SpeechSynthesizer, Voice};
use crate::error::{RelatoError, Result};
use crate::media::{probe_duration, run_ffmpeg};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Gap below which the synthesized length is accepted as-is.
const FIT_TOLERANCE_MS: f64 = 100.0;
/// Speed-up beyond this gap is audible enough to warn about.
const SPEEDUP_WARN_GAP_MS: f64 = 1250.0;
/// Padding beyond this much silence is worth warning about.
const SILENCE_WARN_MS: f64 = 1000.0;

/// Synthesizer backed by the `edge-tts` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTtsSynthesizer;

impl EdgeTtsSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsSynthesizer {
    #[instrument(skip(self, text), fields(voice = %voice, chars = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        audio_output: &Path,
        subtitle_output: Option<&Path>,
    ) -> Result<PathBuf> {
        let mut cmd = Command::new("edge-tts");
        cmd.arg("--voice").arg(voice.id())
            .arg("--text").arg(text)
            .arg("--write-media").arg(audio_output);

        if let Some(subs) = subtitle_output {
            cmd.arg("--write-subtitles").arg(subs);
        }

        let result = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RelatoError::ToolNotFound("edge-tts".into()));
            }
            Err(e) => {
                return Err(RelatoError::Synthesis(format!(
                    "edge-tts execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RelatoError::Synthesis(format!(
                "edge-tts failed: {}",
                stderr.trim()
            )));
        }

        if !audio_output.exists() {
            return Err(RelatoError::Synthesis(
                "edge-tts produced no audio file".into(),
            ));
        }

        info!("Synthesized narration to {}", audio_output.display());
        Ok(audio_output.to_path_buf())
    }
}

/// Stretch or pad a narration track in place to match an expected length.
///
/// Tracks longer than the target are sped up with `atempo`; shorter ones get
/// trailing silence. Gaps within [`FIT_TOLERANCE_MS`] are left alone.
#[instrument(skip_all, fields(audio = %audio.display(), expected_seconds))]
pub async fn fit_duration(audio: &Path, expected_seconds: f64) -> Result<()> {
    if expected_seconds <= 0.0 {
        return Err(RelatoError::InvalidInput(
            "expected duration must be positive".into(),
        ));
    }

    let actual_seconds = probe_duration(audio).await?;
    let gap_ms = (actual_seconds - expected_seconds) * 1000.0;

    if gap_ms.abs() <= FIT_TOLERANCE_MS {
        return Ok(());
    }

    let filter = if gap_ms > 0.0 {
        let factor = actual_seconds / expected_seconds;
        if gap_ms > SPEEDUP_WARN_GAP_MS {
            warn!("Speed factor is high ({:.3}) for {}", factor, audio.display());
        }
        atempo_chain(factor)
    } else {
        if -gap_ms > SILENCE_WARN_MS {
            warn!("Padding {:.0} ms of silence onto {}", -gap_ms, audio.display());
        }
        format!("apad=whole_dur={expected_seconds:.3}")
    };

    let fitted = fit_output_path(audio);
    let args = vec![
        "-i".to_string(),
        audio.display().to_string(),
        "-filter:a".to_string(),
        filter,
        "-y".to_string(),
        fitted.display().to_string(),
    ];
    run_ffmpeg(&args).await?;

    tokio::fs::rename(&fitted, audio).await?;
    Ok(())
}

/// atempo accepts factors in [0.5, 2.0] per stage; chain stages for more.
fn atempo_chain(factor: f64) -> String {
    let mut stages = Vec::new();
    let mut remaining = factor;
    while remaining > 2.0 {
        stages.push("atempo=2.0".to_string());
        remaining /= 2.0;
    }
    stages.push(format!("atempo={remaining:.4}"));
    stages.join(",")
}

/// Sibling path the fitted audio is written to before replacing the input.
fn fit_output_path(audio: &Path) -> PathBuf {
    let stem = audio
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("narration");
    let ext = audio.extension().and_then(|e| e.to_str()).unwrap_or("mp3");
    audio.with_file_name(format!("{stem}_fit.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atempo_chain_single_stage() {
        assert_eq!(atempo_chain(1.25), "atempo=1.2500");
    }

    #[test]
    fn test_atempo_chain_multiple_stages() {
        assert_eq!(atempo_chain(3.0), "atempo=2.0,atempo=1.5000");
    }

    #[test]
    fn test_fit_output_path() {
        let path = fit_output_path(Path::new("/tmp/narration.mp3"));
        assert_eq!(path, PathBuf::from("/tmp/narration_fit.mp3"));
    }
}
