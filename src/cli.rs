use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::naming::{NamingPattern, PatternName};
use crate::segmenter::request::SplitRequest;

/// Wavecut - split audio files into WAV segments
#[derive(Parser, Debug)]
#[command(name = "wavecut", version, about = "Split audio into WAV segments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a file by interval, part count or marker list.
    Split(SplitArgs),
    /// Open the interactive waveform editor.
    Edit(EditArgs),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ModeArgs {
    /// Cut every N minutes (the last segment takes the remainder)
    #[arg(long, value_name = "MINUTES")]
    pub minutes: Option<f64>,

    /// Cut into N equal parts
    #[arg(long, value_name = "N")]
    pub parts: Option<u32>,

    /// Cut at these times (seconds, MM:SS or HH:MM:SS, comma separated)
    #[arg(long, value_name = "TIMES", value_delimiter = ',')]
    pub markers: Option<Vec<String>>,
}

impl ModeArgs {
    pub fn request(&self) -> Result<SplitRequest> {
        if let Some(minutes) = self.minutes {
            return Ok(SplitRequest::IntervalMinutes(minutes));
        }
        if let Some(parts) = self.parts {
            return Ok(SplitRequest::Parts(parts));
        }
        if let Some(raw) = &self.markers {
            let times = raw
                .iter()
                .map(|value| {
                    parse_time_to_seconds(value.trim())
                        .with_context(|| format!("Invalid marker time '{}'", value))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(SplitRequest::Markers(times));
        }
        bail!("Provide one of --minutes, --parts or --markers");
    }
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Input audio file (WAV, MP3, FLAC, OGG, ...)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the segments are written to
    #[arg(long, short, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    #[command(flatten)]
    pub mode: ModeArgs,

    /// Name prefix (defaults to the input file name)
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Built-in naming pattern (defaults to the config's pattern)
    #[arg(long, value_enum, conflicts_with = "template")]
    pub pattern: Option<PatternName>,

    /// Custom name template, e.g. "{prefix}_{num:3d}"
    #[arg(long, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// JSON file overriding the default limits
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replace existing files in the output directory
    #[arg(long)]
    pub overwrite: bool,

    /// Print the planned segments without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl SplitArgs {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.input.is_file(),
            "Input path is not a file: {:?}",
            self.input
        );
        if self.output.exists() && !self.output.is_dir() {
            bail!("Output path must be a directory: {:?}", self.output);
        }
        Ok(())
    }

    /// Naming pattern, falling back to `default` when neither a pattern nor a template is given.
    pub fn naming_pattern(&self, default: PatternName) -> NamingPattern {
        match (&self.template, self.pattern) {
            (Some(template), _) => NamingPattern::Custom(template.clone()),
            (None, Some(name)) => name.into(),
            (None, None) => default.into(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Audio file to open
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Directory the editor exports segments to
    #[arg(long, short, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// JSON file overriding the default limits
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Seconds, `MM:SS(.mmm)` or `HH:MM:SS(.mmm)`.
pub fn parse_time_to_seconds(raw: &str) -> Result<f64> {
    if raw.contains(':') {
        return parse_hms_time(raw);
    }

    let seconds: f64 = raw
        .parse()
        .with_context(|| format!("Failed to parse seconds value '{}'", raw))?;
    ensure!(
        seconds.is_finite() && seconds >= 0.0,
        "Time values must be non-negative"
    );
    Ok(seconds)
}

fn parse_hms_time(raw: &str) -> Result<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    ensure!(
        (2..=3).contains(&parts.len()),
        "Time format must be MM:SS or HH:MM:SS"
    );

    let (seconds_part, minutes_part) = (parts[parts.len() - 1], parts[parts.len() - 2]);
    let seconds = seconds_part
        .parse::<f64>()
        .with_context(|| format!("Invalid seconds component '{}'", seconds_part))?;
    let minutes = minutes_part
        .parse::<f64>()
        .with_context(|| format!("Invalid minutes component '{}'", minutes_part))?;
    ensure!(minutes >= 0.0, "Minutes must be non-negative");
    ensure!(seconds >= 0.0, "Seconds must be non-negative");

    let hours = if parts.len() == 3 {
        let value = parts[0]
            .parse::<f64>()
            .with_context(|| format!("Invalid hours component '{}'", parts[0]))?;
        ensure!(value >= 0.0, "Hours must be non-negative");
        value
    } else {
        0.0
    };

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}
