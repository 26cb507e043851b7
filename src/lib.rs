//! Relato - Narrated Video Generation
//!
//! A CLI tool for assembling narrated videos from text, stock footage and
//! text-to-speech. The name "Relato" is the Spanish word for "tale."
//!
//! # Overview
//!
//! Relato allows you to:
//! - Generate narration scripts with an LLM and synthesize them as audio
//! - Pull background clips from a stock-footage provider into a local library
//! - Assemble looping background video, attach narration, burn subtitles and
//!   mix in music, in a guarded step-by-step workflow
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `toolkit` - The guarded workflow state machine driving assembly
//! - `media` - Video composition (ffmpeg)
//! - `tts` - Speech synthesis (edge-tts)
//! - `subtitles` - Subtitle generation and format conversion
//! - `footage` - Stock clip retrieval and caching
//! - `script` - Narration script generation
//! - `generator` - End-to-end pipeline driver
//!
//! # Example
//!
//! ```rust,no_run
//! use relato::media::Resolution;
//! use relato::toolkit::MediaToolkit;
//! use relato::tts::Voice;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut toolkit = MediaToolkit::new(Resolution::HORIZONTAL, "work")?;
//!
//!     toolkit.create_tts_track("Once upon a time...", Voice::MxMale).await?;
//!     let narration_seconds = toolkit.content_length().await?;
//!     println!("Narration runs {:.1}s", narration_seconds);
//!
//!     toolkit.join_silent_clips(&[PathBuf::from("background.mp4")]).await?;
//!     toolkit.attach_tts_audio().await?;
//!     toolkit.burn_subtitles().await?;
//!     let video = toolkit.mix_music_track(std::path::Path::new("music.mp3"), 0.3).await?;
//!     println!("Final video: {}", video.display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod footage;
pub mod generator;
pub mod media;
pub mod openai;
pub mod script;
pub mod subtitles;
pub mod toolkit;
pub mod tts;

pub use error::{RelatoError, Result};
