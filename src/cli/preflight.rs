//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{RelatoError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Full pipeline: TTS, muxing and a script engine.
    Audiobook,
    /// One-shot narration needs the TTS engine only.
    Narrate,
    /// Clip downloads need the footage API key.
    Fetch,
    /// Whisper transcription needs the OpenAI API key.
    Subtitles,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Audiobook => {
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
            check_tool("edge-tts")?;
            check_script_engine(settings)?;
        }
        Operation::Narrate => {
            check_tool("edge-tts")?;
        }
        Operation::Fetch => {
            settings.footage.resolve_api_key()?;
        }
        Operation::Subtitles => {
            check_openai_key()?;
        }
    }
    Ok(())
}

/// Check that the OpenAI API key is available.
fn check_openai_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        _ => Err(RelatoError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the configured script engine has its API key available.
fn check_script_engine(settings: &Settings) -> Result<()> {
    match settings.script.engine.as_str() {
        "openai" => check_openai_key(),
        _ => settings.script.gemini_api_key().map(|_| ()),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RelatoError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RelatoError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RelatoError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_requires_api_key() {
        let mut settings = Settings::default();
        settings.footage.api_key = Some("key".to_string());
        assert!(check(Operation::Fetch, &settings).is_ok());
    }
}
