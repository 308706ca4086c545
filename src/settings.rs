//! Typed run settings and the JSON loader.
//!
//! The settings file is the only fatal input: a missing or malformed file
//! aborts startup. Everything read here is immutable for the duration of a
//! run.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::screen::Region;

const DEFAULT_THRESHOLD: f32 = 0.8;
const DEFAULT_RETRY_INTERVAL_SECONDS: f64 = 2.0;
const DEFAULT_MAX_RETRIES: u32 = 10;

/// Settings for one automation run, resolved and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Path of the button image to search for. May be empty until the user
    /// picks one; starting a run with it empty is rejected.
    pub template_path: String,
    /// Minimum similarity a match must strictly exceed, in (0, 1).
    pub confidence_threshold: f32,
    /// Base wait between attempts, in seconds. Must be > 0.
    pub retry_interval_seconds: f64,
    /// Screen region to capture and search. `None` means the whole screen.
    pub capture_region: Option<Region>,
    /// Consecutive misses after which a warning is logged. The loop keeps
    /// running past this count.
    pub max_retries: u32,
    /// Search the template at several scales instead of only 1.0.
    pub enable_multiscale: bool,
    /// Save an overlay image of each match for inspection.
    pub debug: bool,
    /// Start/stop key combinations, registered by the frontend.
    pub start_hotkey: Option<String>,
    pub stop_hotkey: Option<String>,
}

/// Raw file shape. Keeps the legacy misspelled `threshhold` key readable so
/// old config files keep working; the loader resolves it once, below.
#[derive(Debug, Deserialize)]
struct SettingsFile {
    template_path: Option<String>,
    threshold: Option<f32>,
    threshhold: Option<f32>,
    retry_interval_seconds: Option<f64>,
    capture_region: Option<Region>,
    max_retries: Option<u32>,
    enable_multiscale: Option<bool>,
    debug: Option<bool>,
    start_hotkey: Option<String>,
    stop_hotkey: Option<String>,
}

impl Settings {
    /// Load and validate settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: SettingsFile = serde_json::from_str(text)?;

        // Canonical key wins when both spellings are present.
        let confidence_threshold = file
            .threshold
            .or(file.threshhold)
            .unwrap_or(DEFAULT_THRESHOLD);

        let settings = Settings {
            template_path: file.template_path.unwrap_or_default(),
            confidence_threshold,
            retry_interval_seconds: file
                .retry_interval_seconds
                .unwrap_or(DEFAULT_RETRY_INTERVAL_SECONDS),
            capture_region: file.capture_region,
            max_retries: file.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            enable_multiscale: file.enable_multiscale.unwrap_or(true),
            debug: file.debug.unwrap_or(false),
            start_hotkey: file.start_hotkey,
            stop_hotkey: file.stop_hotkey,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold < 1.0) {
            return Err(Error::Config(format!(
                "confidence threshold must be in (0, 1), got {}",
                self.confidence_threshold
            )));
        }
        if !(self.retry_interval_seconds > 0.0 && self.retry_interval_seconds.is_finite()) {
            return Err(Error::Config(format!(
                "retry interval must be a positive number of seconds, got {}",
                self.retry_interval_seconds
            )));
        }
        if let Some(region) = &self.capture_region
            && (region.width == 0 || region.height == 0)
        {
            return Err(Error::Config(format!(
                "capture region must have non-zero size, got {}x{}",
                region.width, region.height
            )));
        }
        Ok(())
    }

    pub fn retry_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.retry_interval_seconds)
    }
}
