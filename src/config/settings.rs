//! Configuration settings for Relato.

use crate::error::{RelatoError, Result};
use crate::media::Resolution;
use crate::tts::Voice;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub output: OutputSettings,
    pub tts: TtsSettings,
    pub footage: FootageSettings,
    pub script: ScriptSettings,
    pub subtitles: SubtitleSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory where session artifacts are assembled.
    pub work_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.relato".to_string(),
            work_dir: "~/.relato/work".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Output video settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output resolution as `WIDTHxHEIGHT`.
    pub resolution: String,
    /// Output frame rate.
    pub fps: u32,
    /// Volume factor for mixed-in music tracks.
    pub music_volume: f32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::HORIZONTAL.to_string(),
            fps: 30,
            music_volume: 0.3,
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Default narration voice.
    pub voice: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            voice: "mx-male".to_string(),
        }
    }
}

/// Stock footage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FootageSettings {
    /// Directory for the local clip library.
    pub library_dir: Option<String>,
    /// Pexels API key (falls back to the PEXELS_API_KEY env var).
    pub api_key: Option<String>,
}

impl FootageSettings {
    /// Resolve the Pexels API key from config or environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        std::env::var("PEXELS_API_KEY").map_err(|_| {
            RelatoError::Config(
                "Pexels API key not configured. Set footage.api_key or PEXELS_API_KEY.".to_string(),
            )
        })
    }
}

/// Script generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Script engine (gemini, openai).
    pub engine: String,
    /// Gemini model for script generation.
    pub gemini_model: String,
    /// OpenAI model for script generation.
    pub openai_model: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            engine: "gemini".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl ScriptSettings {
    /// Gemini API key, from the environment only.
    pub fn gemini_api_key(&self) -> Result<String> {
        std::env::var("GEMINI_API_KEY").map_err(|_| {
            RelatoError::Config(
                "GEMINI_API_KEY not set. Set it with: export GEMINI_API_KEY='...'".to_string(),
            )
        })
    }
}

/// Subtitle generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleSettings {
    /// Whisper model used when transcribing narrated video.
    pub whisper_model: String,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            whisper_model: "whisper-1".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| RelatoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("relato")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded session work directory path.
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.work_dir)
    }

    /// Get the expanded clip library path; defaults to `<data_dir>/footage`.
    pub fn library_dir(&self) -> PathBuf {
        match &self.footage.library_dir {
            Some(dir) => Self::expand_path(dir),
            None => self.data_dir().join("footage"),
        }
    }

    /// Parsed output resolution.
    pub fn resolution(&self) -> Result<Resolution> {
        self.output.resolution.parse()
    }

    /// Parsed default narration voice.
    pub fn voice(&self) -> Result<Voice> {
        self.tts.voice.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output.resolution, "1280x720");
        assert_eq!(settings.output.fps, 30);
        assert_eq!(settings.resolution().unwrap(), Resolution::HORIZONTAL);
        assert_eq!(settings.voice().unwrap(), Voice::MxMale);
        assert!(settings.library_dir().ends_with(".relato/footage"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [output]
            resolution = "720x1280"

            [tts]
            voice = "mx-female"
            "#,
        )
        .unwrap();

        assert_eq!(settings.resolution().unwrap(), Resolution::VERTICAL);
        assert_eq!(settings.voice().unwrap(), Voice::MxFemale);
        assert_eq!(settings.output.fps, 30);
        assert_eq!(settings.script.engine, "gemini");
    }
}
