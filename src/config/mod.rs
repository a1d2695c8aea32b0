use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::naming::PatternName;

/// 500 MiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// Limits and interaction tuning shared by the CLI, the session and the editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Largest accepted source file, in bytes.
    pub max_file_bytes: u64,
    /// Media types must start with this prefix.
    pub accepted_media_prefix: String,
    pub min_parts: u32,
    pub max_parts: u32,
    pub default_pattern: PatternName,
    /// Hold time before a touch press places a marker.
    pub long_press_ms: u64,
    /// Movement that cancels a pending long press.
    pub long_press_slop_px: f64,
    /// Distance within which a click hits a marker.
    pub marker_hit_tolerance_px: f64,
    pub max_zoom: f64,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            accepted_media_prefix: "audio/".to_string(),
            min_parts: 2,
            max_parts: 50,
            default_pattern: PatternName::Simple,
            long_press_ms: 500,
            long_press_slop_px: 10.0,
            marker_hit_tolerance_px: 5.0,
            max_zoom: 20.0,
        }
    }
}

impl SplitterConfig {
    /// Load a JSON config file when given, otherwise use the defaults.
    pub fn from_override(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(custom) => load_file(&custom),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("failed to parse config JSON")?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        anyhow::ensure!(
            self.min_parts >= 2 && self.min_parts <= self.max_parts,
            "part limits must satisfy 2 <= min_parts <= max_parts (got {}..={})",
            self.min_parts,
            self.max_parts
        );
        anyhow::ensure!(self.max_zoom >= 1.0, "max_zoom must be at least 1");
        anyhow::ensure!(self.max_file_bytes > 0, "max_file_bytes must be positive");
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<SplitterConfig> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to resolve config file at {:?}", path))?;
    if !canonical.is_file() {
        return Err(anyhow!("config path {:?} is not a file", canonical));
    }
    let raw = std::fs::read_to_string(&canonical)
        .with_context(|| format!("failed to read config file {:?}", canonical))?;
    SplitterConfig::from_json(&raw).with_context(|| format!("invalid config file {:?}", canonical))
}
