//! Relato CLI entry point.

use anyhow::Result;
use clap::Parser;
use relato::cli::{commands, Cli, Commands};
use relato::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("relato={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.work_dir())?;

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Fetch { query, count } => {
            commands::run_fetch(&query, count, settings).await?;
        }

        Commands::Narrate {
            text,
            voice,
            output,
            subtitles,
            fit,
        } => {
            commands::run_narrate(&text, voice, &output, subtitles, fit, settings).await?;
        }

        Commands::Subs { input, output, ass } => {
            commands::run_subs(&input, output, ass, settings).await?;
        }

        Commands::Audiobook {
            book,
            author,
            duration,
            video_loop,
            loop_length,
            music,
            voice,
        } => {
            let args = commands::AudiobookArgs {
                book,
                author,
                duration,
                video_loop,
                loop_length,
                music,
                voice,
            };
            commands::run_audiobook(args, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
