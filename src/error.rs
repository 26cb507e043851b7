//! Error types for Relato.

use crate::toolkit::{StageRequirement, WorkflowStage};
use thiserror::Error;

/// Library-level error type for Relato operations.
#[derive(Error, Debug)]
pub enum RelatoError {
    /// An operation was invoked while the workflow is at a stage its guard
    /// does not permit. No state is mutated and no delegate is called.
    #[error("workflow out of order: {operation} requires a stage {requirement}, but the session is at {stage}")]
    StageViolation {
        operation: &'static str,
        requirement: StageRequirement,
        stage: WorkflowStage,
    },

    #[error("no TTS track has been generated yet (session is at {0})")]
    TrackMissing(WorkflowStage),

    #[error("{operation} needs a {artifact} artifact, but none has been recorded")]
    ArtifactMissing {
        operation: &'static str,
        artifact: &'static str,
    },

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Video composition failed: {0}")]
    Composition(String),

    #[error("Subtitle generation failed: {0}")]
    Subtitles(String),

    #[error("Stock footage error: {0}")]
    Footage(String),

    #[error("Script generation failed: {0}")]
    Script(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Relato operations.
pub type Result<T> = std::result::Result<T, RelatoError>;
