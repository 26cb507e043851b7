//! Gemini script generation backend.

use super::ScriptEngine;
use crate::error::{RelatoError, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Script engine backed by the Gemini `generateContent` API.
pub struct GeminiEngine {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiEngine {
    pub fn new(api_key: impl Into<String>, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ScriptEngine for GeminiEngine {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );

        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}]
        });

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RelatoError::Script(format!(
                "Gemini API error ({}): {}",
                status, text
            )));
        }

        let parsed: serde_json::Value = response.json().await?;
        let text = parsed["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| RelatoError::Script("Gemini returned no script text".into()))?;

        debug!("Gemini returned {} characters", text.len());
        Ok(strip_markup(text))
    }
}

/// Drop markdown bold markers and newlines so the script reads as one flow
/// of TTS-ready text.
fn strip_markup(text: &str) -> String {
    text.replace("**", "").replace('\n', " ").trim().to_string()
}
