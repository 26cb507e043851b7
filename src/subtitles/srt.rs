//! SRT rendering, parsing and conversion to styled ASS.

use super::Transcript;
use crate::error::{RelatoError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// One SubRip cue.
#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue {
    pub index: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

/// Render a transcript as SRT.
pub fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(segment.end_seconds)
        ));
        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }

    output
}

/// Format a timestamp for SRT (00:00:00,000).
pub fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

fn timing_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})")
            .expect("valid SRT timing regex")
    })
}

/// Parse SRT content into cues.
///
/// Tolerates CRLF line endings and `.`-separated milliseconds; cue blocks
/// without a timing line are rejected.
pub fn parse_srt(content: &str) -> Result<Vec<SrtCue>> {
    let normalized = content.replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in normalized.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let mut lines = block.lines();
        let first = lines.next().unwrap_or_default();

        // The numeric counter line is optional in practice.
        let timing_line = if timing_regex().is_match(first) {
            first
        } else {
            lines.next().ok_or_else(|| {
                RelatoError::Subtitles(format!("malformed SRT cue: {:?}", first))
            })?
        };

        let caps = timing_regex().captures(timing_line).ok_or_else(|| {
            RelatoError::Subtitles(format!("invalid SRT timing line: {:?}", timing_line))
        })?;

        let field = |i: usize| -> f64 { caps[i].parse::<f64>().unwrap_or(0.0) };
        let start_seconds = field(1) * 3600.0 + field(2) * 60.0 + field(3) + field(4) / 1000.0;
        let end_seconds = field(5) * 3600.0 + field(6) * 60.0 + field(7) + field(8) / 1000.0;

        let text = lines.collect::<Vec<_>>().join("\n");

        cues.push(SrtCue {
            index: cues.len() + 1,
            start_seconds,
            end_seconds,
            text,
        });
    }

    Ok(cues)
}

/// Style block written into converted ASS files.
#[derive(Debug, Clone)]
pub struct AssStyle {
    pub font_name: String,
    pub font_size: u32,
    /// ABGR colour in ASS notation, e.g. `&H00FFFFFF` for white.
    pub primary_colour: String,
    pub outline_colour: String,
    pub outline: f32,
    /// Vertical margin from the bottom edge, in pixels.
    pub margin_v: u32,
}

impl Default for AssStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 28,
            primary_colour: "&H00FFFFFF".to_string(),
            outline_colour: "&H00000000".to_string(),
            outline: 2.0,
            margin_v: 40,
        }
    }
}

/// Convert an SRT file to ASS with the given style.
pub fn convert_srt_to_ass(
    subtitle_path: &Path,
    output_path: &Path,
    style: &AssStyle,
) -> Result<PathBuf> {
    let content = std::fs::read_to_string(subtitle_path)?;
    let cues = parse_srt(&content)?;
    debug!("Converting {} SRT cues to ASS", cues.len());

    std::fs::write(output_path, render_ass(&cues, style))?;
    Ok(output_path.to_path_buf())
}

fn render_ass(cues: &[SrtCue], style: &AssStyle) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n\n");

    out.push_str("[V4+ Styles]\n");
    out.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, OutlineColour, BackColour, \
         Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV\n",
    );
    out.push_str(&format!(
        "Style: Default,{},{},{},{},&H64000000,0,0,1,{},0,2,10,10,{}\n\n",
        style.font_name,
        style.font_size,
        style.primary_colour,
        style.outline_colour,
        style.outline,
        style.margin_v,
    ));

    out.push_str("[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
    for cue in cues {
        out.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_timestamp(cue.start_seconds),
            format_ass_timestamp(cue.end_seconds),
            cue.text.replace('\n', "\\N"),
        ));
    }

    out
}

/// Format a timestamp for ASS (0:00:00.00, centisecond precision).
fn format_ass_timestamp(seconds: f64) -> String {
    let total_cs = (seconds * 100.0) as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let cs = total_cs % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::TranscriptSegment;

    fn sample_transcript() -> Transcript {
        Transcript {
            segments: vec![
                TranscriptSegment::new(0.0, 2.5, "Hola mundo.".to_string()),
                TranscriptSegment::new(2.5, 5.0, "Esto es una prueba.".to_string()),
            ],
            duration_seconds: 5.0,
        }
    }

    #[test]
    fn test_format_srt() {
        let srt = format_srt(&sample_transcript());
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,500\nHola mundo.\n"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3661.123), "01:01:01,123");
    }

    #[test]
    fn test_parse_roundtrip() {
        let srt = format_srt(&sample_transcript());
        let cues = parse_srt(&srt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hola mundo.");
        assert!((cues[1].start_seconds - 2.5).abs() < 1e-9);
        assert!((cues[1].end_seconds - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_without_counter_lines() {
        let srt = "00:00:01,000 --> 00:00:02,000\nfirst\n\n00:00:02,000 --> 00:00:03,000\nsecond\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_srt("not a subtitle file").is_err());
    }

    #[test]
    fn test_ass_timestamp() {
        assert_eq!(format_ass_timestamp(0.0), "0:00:00.00");
        assert_eq!(format_ass_timestamp(61.5), "0:01:01.50");
        assert_eq!(format_ass_timestamp(3661.12), "1:01:01.12");
    }

    #[test]
    fn test_render_ass_contains_style_and_cues() {
        let cues = vec![SrtCue {
            index: 1,
            start_seconds: 0.0,
            end_seconds: 1.0,
            text: "line one\nline two".to_string(),
        }];
        let ass = render_ass(&cues, &AssStyle::default());
        assert!(ass.contains("[V4+ Styles]"));
        assert!(ass.contains("Style: Default,Arial,28,&H00FFFFFF"));
        assert!(ass.contains("Dialogue: 0,0:00:00.00,0:00:01.00,Default,,0,0,0,,line one\\Nline two"));
    }
}
