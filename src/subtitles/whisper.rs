//! Whisper-based subtitle generation for already-narrated media.

use super::{format_srt, Transcript, TranscriptSegment};
use crate::error::{RelatoError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Generates SRT subtitles from a narrated video or audio file using the
/// OpenAI Whisper API.
pub struct WhisperSubtitler {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperSubtitler {
    /// Create a subtitler with the default Whisper model.
    pub fn new() -> Self {
        Self::with_model("whisper-1")
    }

    /// Create a subtitler with a specific Whisper model.
    pub fn with_model(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }

    /// Transcribe `media` and write the result as SRT to `output`.
    #[instrument(skip(self), fields(media = %media.display()))]
    pub async fn generate_srt(&self, media: &Path, output: &Path) -> Result<PathBuf> {
        let transcript = self.transcribe(media).await?;
        info!(
            "Transcribed {} segments covering {:.1}s",
            transcript.segments.len(),
            transcript.duration_seconds
        );

        tokio::fs::write(output, format_srt(&transcript)).await?;
        Ok(output.to_path_buf())
    }

    async fn transcribe(&self, media: &Path) -> Result<Transcript> {
        debug!("Uploading media for transcription");
        let file_bytes = tokio::fs::read(media).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                media
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("media.mp4")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        let request = request_builder
            .build()
            .map_err(|e| RelatoError::Subtitles(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| RelatoError::Subtitles(format!("Whisper API error: {}", e)))?;

        let duration_seconds = response.duration as f64;
        let segments = response
            .segments
            .map(|segs| {
                segs.iter()
                    .map(|s| {
                        TranscriptSegment::new(
                            s.start as f64,
                            s.end as f64,
                            s.text.trim().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                // Fallback: one segment spanning the whole file.
                vec![TranscriptSegment::new(
                    0.0,
                    duration_seconds,
                    response.text.trim().to_string(),
                )]
            });

        Ok(Transcript {
            segments,
            duration_seconds,
        })
    }
}

impl Default for WhisperSubtitler {
    fn default() -> Self {
        Self::new()
    }
}
