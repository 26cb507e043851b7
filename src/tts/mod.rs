//! Speech synthesis for Relato.
//!
//! Narration is produced by an external TTS engine; the toolkit only sees
//! the [`SpeechSynthesizer`] contract and the resulting file paths.

mod edge;

pub use edge::{fit_duration, EdgeTtsSynthesizer};

use crate::error::{RelatoError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Narration voice, carried as a value rather than per-voice methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voice {
    /// Mexican Spanish female voice (Dalia).
    MxFemale,
    /// Mexican Spanish male voice (Jorge).
    #[default]
    MxMale,
}

impl Voice {
    /// Engine voice identifier.
    pub fn id(self) -> &'static str {
        match self {
            Voice::MxFemale => "es-MX-DaliaNeural",
            Voice::MxMale => "es-MX-JorgeNeural",
        }
    }
}

impl std::str::FromStr for Voice {
    type Err = RelatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mx-female" | "female" | "dalia" | "es-mx-dalianeural" => Ok(Voice::MxFemale),
            "mx-male" | "male" | "jorge" | "es-mx-jorgeneural" => Ok(Voice::MxMale),
            _ => Err(RelatoError::InvalidInput(format!("unknown voice: {}", s))),
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Trait for speech synthesis backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into `audio_output`, optionally writing a subtitle
    /// file alongside. Returns the path of the produced audio file.
    async fn synthesize(
        &self,
        text: &str,
        voice: Voice,
        audio_output: &Path,
        subtitle_output: Option<&Path>,
    ) -> Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_parse() {
        assert_eq!("mx-female".parse::<Voice>().unwrap(), Voice::MxFemale);
        assert_eq!("JORGE".parse::<Voice>().unwrap(), Voice::MxMale);
        assert!("klingon".parse::<Voice>().is_err());
    }

    #[test]
    fn test_voice_id() {
        assert_eq!(Voice::MxFemale.id(), "es-MX-DaliaNeural");
        assert_eq!(Voice::MxMale.to_string(), "es-MX-JorgeNeural");
    }
}
