//! Configuration module for Relato.

mod settings;

pub use settings::{
    FootageSettings, GeneralSettings, OutputSettings, ScriptSettings, Settings,
    SubtitleSettings, TtsSettings,
};
