//! CLI module for Relato.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Relato - Narrated Video Generation
///
/// A CLI tool for assembling narrated videos from text, stock footage and
/// TTS. The name "Relato" is the Spanish word for "tale."
#[derive(Parser, Debug)]
#[command(name = "relato")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Download stock clips for a query into the local library
    Fetch {
        /// Search query for the stock-footage provider
        query: String,

        /// Number of clips to ensure locally
        #[arg(short = 'n', long, default_value = "2")]
        count: usize,
    },

    /// Synthesize a one-shot narration track from text
    Narrate {
        /// Text to narrate
        text: String,

        /// Narration voice (mx-female, mx-male)
        #[arg(short = 'V', long)]
        voice: Option<String>,

        /// Output audio file path
        #[arg(short, long, default_value = "narration.mp3")]
        output: String,

        /// Also write a subtitle file alongside the audio
        #[arg(short, long)]
        subtitles: bool,

        /// Stretch or pad the track to this length in seconds
        #[arg(long)]
        fit: Option<f64>,
    },

    /// Generate subtitles from narrated media via Whisper
    Subs {
        /// Narrated video or audio file to transcribe
        input: String,

        /// Output SRT path (defaults to the input with an .srt extension)
        #[arg(short, long)]
        output: Option<String>,

        /// Also convert the result to a styled ASS file
        #[arg(long)]
        ass: bool,
    },

    /// Generate a complete audiobook video
    Audiobook {
        /// Book title
        #[arg(long)]
        book: String,

        /// Book author
        #[arg(long)]
        author: String,

        /// Target narration length in seconds
        #[arg(short, long, default_value = "300")]
        duration: u32,

        /// Background video clip to loop behind the narration
        #[arg(long)]
        video_loop: String,

        /// Length of one pass of the background clip, in seconds
        #[arg(long)]
        loop_length: f64,

        /// Music track mixed under the narration
        #[arg(long)]
        music: String,

        /// Narration voice (mx-female, mx-male)
        #[arg(short = 'V', long)]
        voice: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Write the default configuration file
    Init,
    /// Print the configuration file path
    Path,
}
