//! Narration script generation for Relato.
//!
//! Scripts are produced by an LLM behind the [`ScriptEngine`] contract;
//! Gemini and OpenAI backends are provided.

mod gemini;
mod openai;

pub use gemini::GeminiEngine;
pub use openai::OpenAiEngine;

use crate::config::Settings;
use crate::error::{RelatoError, Result};
use async_trait::async_trait;

/// Which LLM backend generates scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEngineKind {
    #[default]
    Gemini,
    OpenAi,
}

impl std::str::FromStr for ScriptEngineKind {
    type Err = RelatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ScriptEngineKind::Gemini),
            "openai" => Ok(ScriptEngineKind::OpenAi),
            _ => Err(RelatoError::InvalidInput(format!(
                "unknown script engine: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ScriptEngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptEngineKind::Gemini => write!(f, "gemini"),
            ScriptEngineKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Trait for script generation backends.
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Generate narration text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Create the configured script engine.
pub fn create_engine(settings: &Settings) -> Result<Box<dyn ScriptEngine>> {
    let kind: ScriptEngineKind = settings.script.engine.parse()?;
    match kind {
        ScriptEngineKind::Gemini => Ok(Box::new(GeminiEngine::new(
            settings.script.gemini_api_key()?,
            &settings.script.gemini_model,
        ))),
        ScriptEngineKind::OpenAi => Ok(Box::new(OpenAiEngine::new(&settings.script.openai_model))),
    }
}

/// Framing shared by every narration prompt.
const NARRATOR_ROLE: &str = "You are a clear, captivating narrator of audiobook scripts.";

/// Keeps the model from wrapping the script in anything TTS cannot read.
const TTS_CONSTRAINT: &str = "Important: return only the script text that will be read aloud by \
text-to-speech, with no introduction, commentary, section markers or pause \
indications. If anything in the source material is unclear, mention it inside \
the script as the narrator's own reflection, not as an external note.";

/// Prompt for a complete-book audiobook script.
pub fn audiobook_prompt(book: &str, author: &str, duration_seconds: u32) -> String {
    format!(
        "{NARRATOR_ROLE} Summarize the complete book '{book}' by {author} as a \
narrative script. Cover the key concepts, central ideas and the spiritual or \
scientific tone as the author presents them. Structure the script with an \
opening, a development and a close, written in language accessible to a \
general audience while keeping {author}'s reflective style. The text should \
be suitable for narration lasting approximately {duration_seconds} seconds. \
Do not invent information. {TTS_CONSTRAINT}"
    )
}

/// Prompt for a single-chapter audiobook script.
pub fn chapter_prompt(book: &str, author: &str, chapter: u32, duration_seconds: u32) -> String {
    format!(
        "{NARRATOR_ROLE} Summarize chapter {chapter} of the book '{book}' by \
{author} as a narrative script, suitable for narration lasting approximately \
{duration_seconds} seconds. Cover the key concepts, central ideas and the \
spiritual or scientific tone as the author presents them, in language \
accessible to a general audience while keeping {author}'s reflective style. \
{TTS_CONSTRAINT}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_parse() {
        assert_eq!("gemini".parse::<ScriptEngineKind>().unwrap(), ScriptEngineKind::Gemini);
        assert_eq!("OpenAI".parse::<ScriptEngineKind>().unwrap(), ScriptEngineKind::OpenAi);
        assert!("claude".parse::<ScriptEngineKind>().is_err());
    }

    #[test]
    fn test_audiobook_prompt_mentions_inputs() {
        let prompt = audiobook_prompt("Las Manifestaciones del Ser", "Jacobo Grinberg", 300);
        assert!(prompt.contains("Las Manifestaciones del Ser"));
        assert!(prompt.contains("Jacobo Grinberg"));
        assert!(prompt.contains("300 seconds"));
        assert!(prompt.contains("text-to-speech"));
    }

    #[test]
    fn test_chapter_prompt_mentions_chapter() {
        let prompt = chapter_prompt("A Book", "An Author", 4, 120);
        assert!(prompt.contains("chapter 4"));
        assert!(prompt.contains("120 seconds"));
    }
}
