//! Start/stop key combination parsing.
//!
//! The core only parses, validates and logs the configured combos; actual
//! global registration belongs to the frontend that owns an OS event loop.
//! A combo that fails to parse degrades to the default with a warning so a
//! bad settings value never takes the controls down.

use std::fmt;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::settings::Settings;

pub const DEFAULT_START_COMBO: &str = "ctrl+alt+-";
pub const DEFAULT_STOP_COMBO: &str = "ctrl+alt+=";

/// A parsed key combination: modifier flags plus one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: String,
}

impl Hotkey {
    /// Parse a combo string like `ctrl+alt+-` or `ctrl+shift+f9`.
    pub fn parse(combo: &str) -> Result<Self> {
        let mut hotkey = Hotkey {
            ctrl: false,
            alt: false,
            shift: false,
            key: String::new(),
        };
        for part in combo.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "" => {
                    return Err(Error::Config(format!("empty element in combo '{combo}'")));
                }
                "ctrl" | "control" => hotkey.ctrl = true,
                "alt" => hotkey.alt = true,
                "shift" => hotkey.shift = true,
                key => {
                    if !hotkey.key.is_empty() {
                        return Err(Error::Config(format!(
                            "more than one non-modifier key in combo '{combo}'"
                        )));
                    }
                    hotkey.key = key.to_string();
                }
            }
        }
        if hotkey.key.is_empty() {
            return Err(Error::Config(format!(
                "combo '{combo}' has no non-modifier key"
            )));
        }
        Ok(hotkey)
    }

    fn default_start() -> Self {
        Hotkey {
            ctrl: true,
            alt: true,
            shift: false,
            key: "-".to_string(),
        }
    }

    fn default_stop() -> Self {
        Hotkey {
            ctrl: true,
            alt: true,
            shift: false,
            key: "=".to_string(),
        }
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// The combos a frontend should register for start and stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyConfig {
    pub start: Hotkey,
    pub stop: Hotkey,
}

impl HotkeyConfig {
    /// Resolve the combos from settings, falling back to the defaults on a
    /// missing or unparsable value, and log the result.
    pub fn from_settings(settings: &Settings) -> Self {
        let config = Self {
            start: parse_with_fallback(settings.start_hotkey.as_deref(), Hotkey::default_start),
            stop: parse_with_fallback(settings.stop_hotkey.as_deref(), Hotkey::default_stop),
        };
        info!(
            "hotkeys configured: start ({}), stop ({})",
            config.start, config.stop
        );
        config
    }
}

fn parse_with_fallback(combo: Option<&str>, default: fn() -> Hotkey) -> Hotkey {
    let Some(combo) = combo else {
        return default();
    };
    match Hotkey::parse(combo) {
        Ok(hotkey) => hotkey,
        Err(e) => {
            let fallback = default();
            warn!("{e}; falling back to '{fallback}'");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_combos() {
        let start = Hotkey::parse(DEFAULT_START_COMBO).unwrap();
        assert!(start.ctrl && start.alt && !start.shift);
        assert_eq!(start.key, "-");

        let stop = Hotkey::parse(DEFAULT_STOP_COMBO).unwrap();
        assert_eq!(stop.key, "=");
    }

    #[test]
    fn parses_modifiers_case_insensitively() {
        let hotkey = Hotkey::parse("Ctrl+Shift+F9").unwrap();
        assert!(hotkey.ctrl && hotkey.shift && !hotkey.alt);
        assert_eq!(hotkey.key, "f9");
    }

    #[test]
    fn rejects_combo_without_a_key() {
        assert!(Hotkey::parse("ctrl+alt").is_err());
        assert!(Hotkey::parse("").is_err());
        assert!(Hotkey::parse("ctrl+a+b").is_err());
    }

    #[test]
    fn bad_combo_falls_back_to_default() {
        let hotkey = parse_with_fallback(Some("ctrl+"), Hotkey::default_start);
        assert_eq!(hotkey, Hotkey::default_start());
    }

    #[test]
    fn display_round_trips() {
        let combo = "ctrl+shift+q";
        assert_eq!(Hotkey::parse(combo).unwrap().to_string(), combo);
    }
}
