//! Narrate command - one-shot TTS synthesis.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::tts::{fit_duration, EdgeTtsSynthesizer, SpeechSynthesizer, Voice};
use anyhow::Result;
use std::path::PathBuf;

/// Run the narrate command.
pub async fn run_narrate(
    text: &str,
    voice: Option<String>,
    output: &str,
    subtitles: bool,
    fit: Option<f64>,
    settings: Settings,
) -> Result<()> {
    preflight::check(preflight::Operation::Narrate, &settings)?;

    let voice: Voice = match voice {
        Some(v) => v.parse()?,
        None => settings.voice()?,
    };

    let audio_out = PathBuf::from(output);
    let subs_out = subtitles.then(|| audio_out.with_extension("srt"));

    let spinner = Output::spinner("Synthesizing narration...");
    let synthesizer = EdgeTtsSynthesizer::new();
    let path = synthesizer
        .synthesize(text, voice, &audio_out, subs_out.as_deref())
        .await?;

    if let Some(expected_seconds) = fit {
        spinner.set_message("Fitting track length...");
        fit_duration(&path, expected_seconds).await?;
    }
    spinner.finish_and_clear();

    Output::success(&format!("Narration written to {}", path.display()));
    if let Some(subs) = subs_out {
        Output::list_item(&format!("Subtitles: {}", subs.display()));
    }

    Ok(())
}
