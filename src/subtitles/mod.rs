//! Subtitle generation and conversion for Relato.
//!
//! Narration subtitles normally come straight from the TTS engine; this
//! module covers the video-first path (transcribe a narrated video with
//! Whisper, render SRT) and the SRT to styled-ASS conversion used before
//! burn-in.

mod srt;
mod whisper;

pub use srt::{
    convert_srt_to_ass, format_srt, format_srt_timestamp, parse_srt, AssStyle, SrtCue,
};
pub use whisper::WhisperSubtitler;

/// A transcribed segment with absolute timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text,
        }
    }
}

/// A full transcript of one media file.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub duration_seconds: f64,
}
