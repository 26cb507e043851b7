//! Media toolkit: the guarded workflow facade for video assembly.
//!
//! A [`MediaToolkit`] owns one session's artifacts (narration track,
//! subtitle file, current video) and the [`WorkflowStage`] the session has
//! reached. Every operation checks its stage guard before delegating to the
//! external collaborators, records the produced artifact on success, and
//! advances the stage. Guard failures never mutate state and never invoke a
//! delegate; delegate failures propagate unmodified and leave the session at
//! its last successfully reached stage.
//!
//! Sessions are single-owner and synchronous: operations take `&mut self`
//! and there is no internal locking. One pipeline run owns one toolkit.

mod stage;

pub use stage::{StageRequirement, WorkflowStage};

use crate::error::{RelatoError, Result};
use crate::media::{FfmpegCompositor, Resolution, VideoCompositor};
use crate::tts::{EdgeTtsSynthesizer, SpeechSynthesizer, Voice};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

// Default artifact file names inside the session work directory.
const TTS_TRACK_FILENAME: &str = "narration.mp3";
const SUBTITLES_FILENAME: &str = "subtitles.srt";
const SILENT_VIDEO_FILENAME: &str = "silent_video.mp4";
const TTS_AUDIO_VIDEO_FILENAME: &str = "tts_audio_video.mp4";
const JOINED_AUDIO_VIDEO_FILENAME: &str = "joined_audio_video.mp4";
const SUBS_VIDEO_FILENAME: &str = "tts_audio_video_subs.mp4";
const MUSIC_VIDEO_FILENAME: &str = "tts_audio_video_music.mp4";

const DEFAULT_FPS: u32 = 30;

/// One video-assembly session.
pub struct MediaToolkit {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    compositor: Arc<dyn VideoCompositor>,
    resolution: Resolution,
    fps: u32,
    work_dir: PathBuf,
    stage: WorkflowStage,
    tts_track: Option<PathBuf>,
    subtitles: Option<PathBuf>,
    video: Option<PathBuf>,
}

impl MediaToolkit {
    /// Create a toolkit with the default engines (edge-tts, ffmpeg).
    pub fn new(resolution: Resolution, work_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_components(
            resolution,
            work_dir,
            Arc::new(EdgeTtsSynthesizer::new()),
            Arc::new(FfmpegCompositor::new()),
        )
    }

    /// Create a toolkit with custom collaborators.
    pub fn with_components(
        resolution: Resolution,
        work_dir: impl Into<PathBuf>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        compositor: Arc<dyn VideoCompositor>,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        std::fs::create_dir_all(&work_dir)?;

        Ok(Self {
            synthesizer,
            compositor,
            resolution,
            fps: DEFAULT_FPS,
            work_dir,
            stage: WorkflowStage::New,
            tts_track: None,
            subtitles: None,
            video: None,
        })
    }

    /// Override the output frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Current workflow stage.
    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    /// Most recent composed video, if any stage has produced one.
    pub fn video_path(&self) -> Option<&Path> {
        self.video.as_deref()
    }

    /// The narration track, once generated.
    pub fn tts_track_path(&self) -> Option<&Path> {
        self.tts_track.as_deref()
    }

    /// The narration subtitle file, once generated.
    pub fn subtitles_path(&self) -> Option<&Path> {
        self.subtitles.as_deref()
    }

    /// Synthesize the narration track (and its subtitle file).
    ///
    /// Only valid on a fresh session: once a track exists it cannot be
    /// replaced within the same session.
    #[instrument(skip(self, text), fields(voice = %voice, chars = text.len()))]
    pub async fn create_tts_track(&mut self, text: &str, voice: Voice) -> Result<PathBuf> {
        self.guard(
            "create_tts_track",
            StageRequirement::Below(WorkflowStage::TtsTrack),
        )?;

        let audio_out = self.work_dir.join(TTS_TRACK_FILENAME);
        let subs_out = self.work_dir.join(SUBTITLES_FILENAME);

        let track = self
            .synthesizer
            .synthesize(text, voice, &audio_out, Some(&subs_out))
            .await?;

        info!("TTS track created at {}", track.display());
        self.tts_track = Some(track.clone());
        self.subtitles = Some(subs_out);
        self.advance(WorkflowStage::TtsTrack);

        Ok(track)
    }

    /// Duration of the narration track in seconds.
    ///
    /// Callers use this to size the background video (how many loop copies
    /// are needed to cover the narration).
    pub async fn content_length(&self) -> Result<f64> {
        if self.stage < WorkflowStage::TtsTrack {
            return Err(RelatoError::TrackMissing(self.stage));
        }
        let track = self
            .tts_track
            .as_ref()
            .ok_or(RelatoError::TrackMissing(self.stage))?;

        self.compositor.media_duration(track).await
    }

    /// Assemble (or re-assemble) the silent background video from clips.
    ///
    /// May be repeated until narration is attached; each call overwrites the
    /// session's current video.
    #[instrument(skip(self, clips), fields(clips = clips.len()))]
    pub async fn join_silent_clips(&mut self, clips: &[PathBuf]) -> Result<PathBuf> {
        self.guard(
            "join_silent_clips",
            StageRequirement::AtMost(WorkflowStage::NonAudioVideo),
        )?;

        let output = self.work_dir.join(SILENT_VIDEO_FILENAME);
        let video = self
            .compositor
            .join_silent_videos(clips, self.resolution, self.fps, &output)
            .await?;

        info!("Silent video assembled at {}", video.display());
        self.video = Some(video.clone());
        self.advance(WorkflowStage::NonAudioVideo);

        Ok(video)
    }

    /// Attach the narration track to the assembled silent video.
    #[instrument(skip(self))]
    pub async fn attach_tts_audio(&mut self) -> Result<PathBuf> {
        self.guard(
            "attach_tts_audio",
            StageRequirement::Exactly(WorkflowStage::NonAudioVideo),
        )?;
        // The silent video can be assembled before any narration exists, so
        // the stage check alone does not imply a track.
        let track = self
            .tts_track
            .clone()
            .ok_or(RelatoError::TrackMissing(self.stage))?;
        let video = self.require_video("attach_tts_audio")?;

        let output = self.work_dir.join(TTS_AUDIO_VIDEO_FILENAME);
        let joined = self
            .compositor
            .join_video_with_audio(&[video, track], self.resolution, &output)
            .await?;

        info!("Narration attached, video at {}", joined.display());
        self.video = Some(joined.clone());
        self.advance(WorkflowStage::TtsAudioVideo);

        Ok(joined)
    }

    /// Join additional clips that already carry narration audio.
    #[instrument(skip(self, clips), fields(clips = clips.len()))]
    pub async fn join_narrated_clips(&mut self, clips: &[PathBuf]) -> Result<PathBuf> {
        self.guard(
            "join_narrated_clips",
            StageRequirement::AtLeast(WorkflowStage::TtsAudioVideo),
        )?;

        let output = self.work_dir.join(JOINED_AUDIO_VIDEO_FILENAME);
        let joined = self
            .compositor
            .join_video_with_audio(clips, self.resolution, &output)
            .await?;

        info!("Narrated clips joined at {}", joined.display());
        self.video = Some(joined.clone());
        self.advance(WorkflowStage::TtsAudioVideo);

        Ok(joined)
    }

    /// Burn the narration subtitles into the current video.
    #[instrument(skip(self))]
    pub async fn burn_subtitles(&mut self) -> Result<PathBuf> {
        self.guard(
            "burn_subtitles",
            StageRequirement::AtLeast(WorkflowStage::TtsAudioVideo),
        )?;
        let subtitles = self.require_artifact("burn_subtitles", "subtitle", &self.subtitles)?;
        let video = self.require_video("burn_subtitles")?;

        let output = self.work_dir.join(SUBS_VIDEO_FILENAME);
        let burned = self
            .compositor
            .burn_subtitles(&video, &subtitles, &output)
            .await?;

        info!("Subtitles burned, video at {}", burned.display());
        self.video = Some(burned.clone());
        self.advance(WorkflowStage::TtsAudioVideoSubs);

        Ok(burned)
    }

    /// Mix a music track under the narration at reduced volume.
    #[instrument(skip(self), fields(music = %music.display()))]
    pub async fn mix_music_track(&mut self, music: &Path, volume: f32) -> Result<PathBuf> {
        self.guard(
            "mix_music_track",
            StageRequirement::AtLeast(WorkflowStage::TtsAudioVideo),
        )?;
        let video = self.require_video("mix_music_track")?;

        let output = self.work_dir.join(MUSIC_VIDEO_FILENAME);
        let mixed = self
            .compositor
            .mix_audio_into_video(&video, music, &output, volume)
            .await?;

        info!("Music mixed, video at {}", mixed.display());
        self.video = Some(mixed.clone());
        self.advance(WorkflowStage::TtsAudioVideoMusic);

        Ok(mixed)
    }

    /// Check an operation's stage guard without touching any state.
    fn guard(&self, operation: &'static str, requirement: StageRequirement) -> Result<()> {
        if requirement.permits(self.stage) {
            Ok(())
        } else {
            Err(RelatoError::StageViolation {
                operation,
                requirement,
                stage: self.stage,
            })
        }
    }

    /// Move the stage forward; a successful operation never moves it back.
    fn advance(&mut self, target: WorkflowStage) {
        let next = self.stage.max(target);
        debug!("Workflow stage {} -> {}", self.stage, next);
        self.stage = next;
    }

    fn require_video(&self, operation: &'static str) -> Result<PathBuf> {
        self.video.clone().ok_or(RelatoError::ArtifactMissing {
            operation,
            artifact: "video",
        })
    }

    fn require_artifact(
        &self,
        operation: &'static str,
        artifact: &'static str,
        value: &Option<PathBuf>,
    ) -> Result<PathBuf> {
        value.clone().ok_or(RelatoError::ArtifactMissing {
            operation,
            artifact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeSynthesizer {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynthesizer {
        async fn synthesize(
            &self,
            text: &str,
            _voice: Voice,
            audio_output: &Path,
            _subtitle_output: Option<&Path>,
        ) -> Result<PathBuf> {
            self.calls.lock().unwrap().push(format!("synthesize:{text}"));
            Ok(audio_output.to_path_buf())
        }
    }

    struct FakeCompositor {
        calls: Mutex<Vec<String>>,
        duration: f64,
        fail: AtomicBool,
    }

    impl FakeCompositor {
        fn new(duration: f64) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                duration,
                fail: AtomicBool::new(false),
            }
        }

        fn record(&self, call: &str) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RelatoError::ToolFailed("ffmpeg: boom".into()));
            }
            self.calls.lock().unwrap().push(call.to_string());
            Ok(())
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VideoCompositor for FakeCompositor {
        async fn join_silent_videos(
            &self,
            clips: &[PathBuf],
            _resolution: Resolution,
            _fps: u32,
            output: &Path,
        ) -> Result<PathBuf> {
            self.record(&format!("join_silent:{}", clips.len()))?;
            Ok(output.to_path_buf())
        }

        async fn join_video_with_audio(
            &self,
            media: &[PathBuf],
            _resolution: Resolution,
            output: &Path,
        ) -> Result<PathBuf> {
            self.record(&format!("join_av:{}", media.len()))?;
            Ok(output.to_path_buf())
        }

        async fn burn_subtitles(
            &self,
            _video: &Path,
            _subtitles: &Path,
            output: &Path,
        ) -> Result<PathBuf> {
            self.record("burn_subtitles")?;
            Ok(output.to_path_buf())
        }

        async fn mix_audio_into_video(
            &self,
            _video: &Path,
            _audio: &Path,
            output: &Path,
            volume: f32,
        ) -> Result<PathBuf> {
            self.record(&format!("mix:{volume}"))?;
            Ok(output.to_path_buf())
        }

        async fn media_duration(&self, _path: &Path) -> Result<f64> {
            Ok(self.duration)
        }
    }

    fn toolkit(duration: f64) -> (MediaToolkit, Arc<FakeSynthesizer>, Arc<FakeCompositor>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = Arc::new(FakeSynthesizer::default());
        let compositor = Arc::new(FakeCompositor::new(duration));
        let toolkit = MediaToolkit::with_components(
            Resolution::HORIZONTAL,
            dir.path(),
            synthesizer.clone(),
            compositor.clone(),
        )
        .unwrap();
        (toolkit, synthesizer, compositor, dir)
    }

    async fn narrated(toolkit: &mut MediaToolkit) {
        toolkit
            .create_tts_track("hello", Voice::MxMale)
            .await
            .unwrap();
        toolkit
            .join_silent_clips(&[PathBuf::from("clip.mp4")])
            .await
            .unwrap();
        toolkit.attach_tts_audio().await.unwrap();
    }

    #[tokio::test]
    async fn content_length_on_fresh_session_is_missing() {
        let (toolkit, _, _, _dir) = toolkit(2.0);
        let err = toolkit.content_length().await.unwrap_err();
        assert!(matches!(err, RelatoError::TrackMissing(WorkflowStage::New)));
    }

    #[tokio::test]
    async fn tts_track_advances_stage_and_reports_length() {
        let (mut toolkit, synthesizer, _, _dir) = toolkit(2.0);
        toolkit
            .create_tts_track("hello", Voice::MxFemale)
            .await
            .unwrap();

        assert_eq!(toolkit.stage(), WorkflowStage::TtsTrack);
        assert!(toolkit.tts_track_path().is_some());
        assert!(toolkit.subtitles_path().is_some());
        assert_eq!(toolkit.content_length().await.unwrap(), 2.0);
        assert_eq!(synthesizer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_tts_track_is_rejected() {
        let (mut toolkit, synthesizer, _, _dir) = toolkit(2.0);
        toolkit.create_tts_track("one", Voice::MxMale).await.unwrap();

        let err = toolkit
            .create_tts_track("two", Voice::MxMale)
            .await
            .unwrap_err();
        assert!(matches!(err, RelatoError::StageViolation { .. }));
        assert_eq!(toolkit.stage(), WorkflowStage::TtsTrack);
        // The delegate is never reached on a guard failure.
        assert_eq!(synthesizer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn attach_requires_assembled_video_stage() {
        let (mut toolkit, _, compositor, _dir) = toolkit(2.0);
        let err = toolkit.attach_tts_audio().await.unwrap_err();

        assert!(matches!(
            err,
            RelatoError::StageViolation {
                operation: "attach_tts_audio",
                stage: WorkflowStage::New,
                ..
            }
        ));
        assert_eq!(compositor.call_count(), 0);
    }

    #[tokio::test]
    async fn attach_without_track_is_caught() {
        // Silent assembly is legal before narration exists, so the stage
        // guard alone passes; the missing track must still be caught.
        let (mut toolkit, _, compositor, _dir) = toolkit(2.0);
        toolkit
            .join_silent_clips(&[PathBuf::from("clip.mp4")])
            .await
            .unwrap();

        let err = toolkit.attach_tts_audio().await.unwrap_err();
        assert!(matches!(
            err,
            RelatoError::TrackMissing(WorkflowStage::NonAudioVideo)
        ));
        assert_eq!(toolkit.stage(), WorkflowStage::NonAudioVideo);
        assert_eq!(compositor.call_count(), 1);
    }

    #[tokio::test]
    async fn silent_join_repeats_until_audio_attached() {
        let (mut toolkit, _, compositor, _dir) = toolkit(2.0);
        toolkit.create_tts_track("hi", Voice::MxMale).await.unwrap();

        toolkit
            .join_silent_clips(&[PathBuf::from("a.mp4")])
            .await
            .unwrap();
        toolkit
            .join_silent_clips(&[PathBuf::from("a.mp4"), PathBuf::from("b.mp4")])
            .await
            .unwrap();

        assert_eq!(toolkit.stage(), WorkflowStage::NonAudioVideo);
        assert_eq!(compositor.call_count(), 2);

        toolkit.attach_tts_audio().await.unwrap();
        let err = toolkit
            .join_silent_clips(&[PathBuf::from("c.mp4")])
            .await
            .unwrap_err();
        assert!(matches!(err, RelatoError::StageViolation { .. }));
    }

    #[tokio::test]
    async fn subtitles_then_music_reaches_final_stage() {
        let (mut toolkit, _, _, _dir) = toolkit(2.0);
        narrated(&mut toolkit).await;
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideo);

        let with_subs = toolkit.burn_subtitles().await.unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideoSubs);
        assert_eq!(toolkit.video_path().unwrap(), with_subs.as_path());

        let with_music = toolkit
            .mix_music_track(Path::new("music.mp3"), 0.3)
            .await
            .unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideoMusic);
        assert_eq!(toolkit.video_path().unwrap(), with_music.as_path());
        assert_ne!(with_subs, with_music);
    }

    #[tokio::test]
    async fn music_then_subtitles_is_also_valid() {
        let (mut toolkit, _, _, _dir) = toolkit(2.0);
        narrated(&mut toolkit).await;

        toolkit
            .mix_music_track(Path::new("music.mp3"), 0.5)
            .await
            .unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideoMusic);

        // Burning subtitles afterwards is permitted and never moves the
        // stage backwards.
        toolkit.burn_subtitles().await.unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideoMusic);
    }

    #[tokio::test]
    async fn burn_before_audio_attach_is_rejected() {
        let (mut toolkit, _, compositor, _dir) = toolkit(2.0);
        toolkit
            .join_silent_clips(&[PathBuf::from("clip.mp4")])
            .await
            .unwrap();

        let err = toolkit.burn_subtitles().await.unwrap_err();
        assert!(matches!(
            err,
            RelatoError::StageViolation {
                operation: "burn_subtitles",
                stage: WorkflowStage::NonAudioVideo,
                ..
            }
        ));
        assert_eq!(compositor.call_count(), 1);
    }

    #[tokio::test]
    async fn narrated_join_never_lowers_stage() {
        let (mut toolkit, _, _, _dir) = toolkit(2.0);
        narrated(&mut toolkit).await;
        toolkit.burn_subtitles().await.unwrap();

        toolkit
            .join_narrated_clips(&[PathBuf::from("x.mp4"), PathBuf::from("y.mp3")])
            .await
            .unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::TtsAudioVideoSubs);
    }

    #[tokio::test]
    async fn delegate_failure_leaves_session_unchanged() {
        let (mut toolkit, _, compositor, _dir) = toolkit(2.0);
        toolkit.create_tts_track("hi", Voice::MxMale).await.unwrap();

        compositor.fail.store(true, Ordering::SeqCst);
        let err = toolkit
            .join_silent_clips(&[PathBuf::from("a.mp4")])
            .await
            .unwrap_err();
        assert!(matches!(err, RelatoError::ToolFailed(_)));

        assert_eq!(toolkit.stage(), WorkflowStage::TtsTrack);
        assert!(toolkit.video_path().is_none());

        // The same call succeeds once the underlying cause is fixed.
        compositor.fail.store(false, Ordering::SeqCst);
        toolkit
            .join_silent_clips(&[PathBuf::from("a.mp4")])
            .await
            .unwrap();
        assert_eq!(toolkit.stage(), WorkflowStage::NonAudioVideo);
    }

    #[test]
    fn stage_violation_message_names_both_stages() {
        let err = RelatoError::StageViolation {
            operation: "burn_subtitles",
            requirement: StageRequirement::AtLeast(WorkflowStage::TtsAudioVideo),
            stage: WorkflowStage::NonAudioVideo,
        };
        let message = err.to_string();
        assert!(message.contains("burn_subtitles"));
        assert!(message.contains("TTS_AUDIO_VIDEO (3)"));
        assert!(message.contains("NON_AUDIO_VIDEO (2)"));
    }
}
