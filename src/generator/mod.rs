//! Long-form content generation: script to finished audiobook video.
//!
//! The generator owns one script engine and one [`MediaToolkit`] session and
//! walks them through the full assembly sequence. The by-chapter and
//! topic-based flows are not implemented; only the complete-book pipeline
//! has defined behavior.

use crate::error::Result;
use crate::script::{audiobook_prompt, ScriptEngine};
use crate::toolkit::MediaToolkit;
use crate::tts::Voice;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Inputs for a complete audiobook video.
#[derive(Debug, Clone)]
pub struct AudiobookRequest {
    pub book: String,
    pub author: String,
    /// Target narration length, passed to the script engine.
    pub duration_seconds: u32,
    pub voice: Voice,
    /// Background clip looped for the whole narration.
    pub video_loop: PathBuf,
    /// Length of one pass of the background clip.
    pub loop_length_seconds: f64,
    pub music_track: PathBuf,
    pub music_volume: f32,
}

/// Drives a script engine and a toolkit session through the long-form
/// pipeline: script, narration, background assembly, attach, subtitles,
/// music.
pub struct AudiobookGenerator {
    script_engine: Box<dyn ScriptEngine>,
    toolkit: MediaToolkit,
}

impl AudiobookGenerator {
    pub fn new(script_engine: Box<dyn ScriptEngine>, toolkit: MediaToolkit) -> Self {
        Self {
            script_engine,
            toolkit,
        }
    }

    /// Generate a complete audiobook video and return its final path.
    #[instrument(skip(self, request), fields(book = %request.book, author = %request.author))]
    pub async fn create_audiobook(&mut self, request: &AudiobookRequest) -> Result<PathBuf> {
        let prompt = audiobook_prompt(&request.book, &request.author, request.duration_seconds);
        let script = self.script_engine.generate(&prompt).await?;
        info!("Script generated ({} characters)", script.len());

        self.toolkit.create_tts_track(&script, request.voice).await?;

        let content_seconds = self.toolkit.content_length().await?;
        let copies = loop_copies(content_seconds, request.loop_length_seconds);
        info!(
            "Narration runs {:.1}s; background loop repeated {} times",
            content_seconds, copies
        );

        let clips = vec![request.video_loop.clone(); copies];
        self.toolkit.join_silent_clips(&clips).await?;
        self.toolkit.attach_tts_audio().await?;
        self.toolkit.burn_subtitles().await?;
        self.toolkit
            .mix_music_track(&request.music_track, request.music_volume)
            .await
    }

    /// The toolkit session, for inspecting artifacts after a run.
    pub fn toolkit(&self) -> &MediaToolkit {
        &self.toolkit
    }
}

/// Background copies needed to cover the narration, always at least one.
fn loop_copies(content_seconds: f64, loop_seconds: f64) -> usize {
    if loop_seconds <= 0.0 {
        return 1;
    }
    ((content_seconds / loop_seconds).ceil() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelatoError;
    use crate::media::{Resolution, VideoCompositor};
    use crate::toolkit::WorkflowStage;
    use crate::tts::SpeechSynthesizer;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_loop_copies() {
        assert_eq!(loop_copies(95.0, 30.0), 4);
        assert_eq!(loop_copies(90.0, 30.0), 3);
        assert_eq!(loop_copies(5.0, 30.0), 1);
        assert_eq!(loop_copies(10.0, 0.0), 1);
    }

    struct ScriptedEngine;

    #[async_trait]
    impl ScriptEngine for ScriptedEngine {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("Once upon a time.".to_string())
        }
    }

    struct PassthroughSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for PassthroughSynthesizer {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: Voice,
            audio_output: &Path,
            _subtitle_output: Option<&Path>,
        ) -> Result<PathBuf> {
            Ok(audio_output.to_path_buf())
        }
    }

    struct RecordingCompositor {
        calls: Mutex<Vec<String>>,
        duration: f64,
    }

    #[async_trait]
    impl VideoCompositor for RecordingCompositor {
        async fn join_silent_videos(
            &self,
            clips: &[PathBuf],
            _resolution: Resolution,
            _fps: u32,
            output: &Path,
        ) -> Result<PathBuf> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("join_silent:{}", clips.len()));
            Ok(output.to_path_buf())
        }

        async fn join_video_with_audio(
            &self,
            _media: &[PathBuf],
            _resolution: Resolution,
            output: &Path,
        ) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("join_av".to_string());
            Ok(output.to_path_buf())
        }

        async fn burn_subtitles(
            &self,
            _video: &Path,
            _subtitles: &Path,
            output: &Path,
        ) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("burn".to_string());
            Ok(output.to_path_buf())
        }

        async fn mix_audio_into_video(
            &self,
            _video: &Path,
            _audio: &Path,
            output: &Path,
            _volume: f32,
        ) -> Result<PathBuf> {
            self.calls.lock().unwrap().push("mix".to_string());
            Ok(output.to_path_buf())
        }

        async fn media_duration(&self, _path: &Path) -> std::result::Result<f64, RelatoError> {
            Ok(self.duration)
        }
    }

    #[tokio::test]
    async fn audiobook_runs_full_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let compositor = Arc::new(RecordingCompositor {
            calls: Mutex::new(Vec::new()),
            duration: 65.0,
        });
        let toolkit = MediaToolkit::with_components(
            Resolution::HORIZONTAL,
            dir.path(),
            Arc::new(PassthroughSynthesizer),
            compositor.clone(),
        )
        .unwrap();

        let mut generator = AudiobookGenerator::new(Box::new(ScriptedEngine), toolkit);
        let request = AudiobookRequest {
            book: "A Book".to_string(),
            author: "An Author".to_string(),
            duration_seconds: 60,
            voice: Voice::MxMale,
            video_loop: PathBuf::from("loop.mp4"),
            loop_length_seconds: 30.0,
            music_track: PathBuf::from("music.mp3"),
            music_volume: 0.3,
        };

        let final_video = generator.create_audiobook(&request).await.unwrap();
        assert!(final_video.ends_with("tts_audio_video_music.mp4"));
        assert_eq!(
            generator.toolkit().stage(),
            WorkflowStage::TtsAudioVideoMusic
        );

        // 65s of narration over a 30s loop needs three copies.
        let calls = compositor.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["join_silent:3", "join_av", "burn", "mix"]);
    }
}
