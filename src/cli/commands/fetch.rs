//! Fetch command - download stock clips into the local library.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::footage::{FootageLibrary, PexelsClient};
use anyhow::Result;

/// Run the fetch command.
pub async fn run_fetch(query: &str, count: usize, settings: Settings) -> Result<()> {
    preflight::check(preflight::Operation::Fetch, &settings)?;

    let client = PexelsClient::new(settings.footage.resolve_api_key()?);
    let mut library = FootageLibrary::open(settings.library_dir(), client)?;

    Output::info(&format!("Fetching {} clip(s) for '{}'...", count, query));
    let clips = library.fetch(query, count).await?;

    Output::success(&format!("{} clip(s) ready:", clips.len()));
    for clip in &clips {
        Output::list_item(&clip.display().to_string());
    }

    Ok(())
}
