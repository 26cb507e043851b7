//! Audiobook command - run the full long-form pipeline.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::generator::{AudiobookGenerator, AudiobookRequest};
use crate::script::create_engine;
use crate::toolkit::MediaToolkit;
use crate::tts::Voice;
use anyhow::Result;
use std::path::PathBuf;

/// Arguments for one audiobook run.
pub struct AudiobookArgs {
    pub book: String,
    pub author: String,
    pub duration: u32,
    pub video_loop: String,
    pub loop_length: f64,
    pub music: String,
    pub voice: Option<String>,
}

/// Run the audiobook command.
pub async fn run_audiobook(args: AudiobookArgs, settings: Settings) -> Result<()> {
    preflight::check(preflight::Operation::Audiobook, &settings)?;

    let video_loop = PathBuf::from(&args.video_loop);
    if !video_loop.exists() {
        anyhow::bail!("background clip not found: {}", video_loop.display());
    }
    let music_track = PathBuf::from(&args.music);
    if !music_track.exists() {
        anyhow::bail!("music track not found: {}", music_track.display());
    }

    let voice: Voice = match &args.voice {
        Some(v) => v.parse()?,
        None => settings.voice()?,
    };

    let toolkit = MediaToolkit::new(settings.resolution()?, settings.work_dir())?
        .with_fps(settings.output.fps);
    let engine = create_engine(&settings)?;
    let mut generator = AudiobookGenerator::new(engine, toolkit);

    let request = AudiobookRequest {
        book: args.book.clone(),
        author: args.author.clone(),
        duration_seconds: args.duration,
        voice,
        video_loop,
        loop_length_seconds: args.loop_length,
        music_track,
        music_volume: settings.output.music_volume,
    };

    Output::info(&format!(
        "Generating audiobook for '{}' by {}...",
        args.book, args.author
    ));
    let video = generator.create_audiobook(&request).await?;

    Output::success(&format!("Audiobook video created: {}", video.display()));
    Ok(())
}
