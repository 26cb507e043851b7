//! Subs command - transcribe narrated media into subtitle files.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::subtitles::{convert_srt_to_ass, AssStyle, WhisperSubtitler};
use anyhow::Result;
use std::path::PathBuf;

/// Run the subs command.
pub async fn run_subs(
    input: &str,
    output: Option<String>,
    ass: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(preflight::Operation::Subtitles, &settings)?;

    let input_path = PathBuf::from(input);
    if !input_path.exists() {
        anyhow::bail!("media file not found: {}", input_path.display());
    }

    let srt_out = match output {
        Some(o) => PathBuf::from(o),
        None => input_path.with_extension("srt"),
    };

    let spinner = Output::spinner("Transcribing with Whisper...");
    let subtitler = WhisperSubtitler::with_model(&settings.subtitles.whisper_model);
    let srt = subtitler.generate_srt(&input_path, &srt_out).await?;
    spinner.finish_and_clear();

    Output::success(&format!("Subtitles written to {}", srt.display()));

    if ass {
        let ass_out = srt.with_extension("ass");
        convert_srt_to_ass(&srt, &ass_out, &AssStyle::default())?;
        Output::list_item(&format!("ASS: {}", ass_out.display()));
    }

    Ok(())
}
