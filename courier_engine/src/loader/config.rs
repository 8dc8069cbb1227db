//! Engine timing settings and loader.
//!
//! Settings live in `courier.toml` under an `[engine]` table. Every key is optional; a
//! missing file, a parse failure or an out-of-range value falls back to the default.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for dialogue, fades and the REPL settle loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds per revealed dialogue character.
    pub typing_delay: f32,
    /// Seconds for each half (out / in) of a scene fade.
    pub fade_duration: f32,
    /// Music volume change per second.
    pub bgm_fade_rate: f32,
    /// Refuse scene requests while a load runs.
    pub lock_during_load: bool,
    /// Wrap around at either end of the scene list for `go next` / `go back`.
    pub wrap_scenes: bool,
    /// Simulated seconds per tick when the REPL settles the world.
    pub tick_seconds: f32,
    /// Upper bound on ticks per command.
    pub settle_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            typing_delay: 0.02,
            fade_duration: 0.25,
            bgm_fade_rate: 2.0,
            lock_during_load: true,
            wrap_scenes: false,
            tick_seconds: 1.0 / 60.0,
            settle_limit: 3600,
        }
    }
}

impl EngineConfig {
    /// Replace nonsensical values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.typing_delay.is_finite() || self.typing_delay < 0.0 {
            warn!("typing_delay {} is invalid; using {}", self.typing_delay, defaults.typing_delay);
            self.typing_delay = defaults.typing_delay;
        }
        if !self.fade_duration.is_finite() || self.fade_duration < 0.0 {
            warn!("fade_duration {} is invalid; using {}", self.fade_duration, defaults.fade_duration);
            self.fade_duration = defaults.fade_duration;
        }
        if !self.bgm_fade_rate.is_finite() || self.bgm_fade_rate <= 0.0 {
            warn!("bgm_fade_rate {} is invalid; using {}", self.bgm_fade_rate, defaults.bgm_fade_rate);
            self.bgm_fade_rate = defaults.bgm_fade_rate;
        }
        if !self.tick_seconds.is_finite() || self.tick_seconds <= 0.0 {
            warn!("tick_seconds {} is invalid; using {}", self.tick_seconds, defaults.tick_seconds);
            self.tick_seconds = defaults.tick_seconds;
        }
        if self.settle_limit == 0 {
            warn!("settle_limit must be positive; using {}", defaults.settle_limit);
            self.settle_limit = defaults.settle_limit;
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

/// Loads engine settings from a TOML file, falling back to defaults on error.
pub fn load_config(toml_path: &Path) -> EngineConfig {
    match try_load_config(toml_path) {
        Ok(config) => {
            info!("engine settings loaded from '{}'", toml_path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load engine settings from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            EngineConfig::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(toml_path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(toml_path)
        .with_context(|| format!("reading engine settings from '{}'", toml_path.display()))?;
    parse_config(&raw).with_context(|| format!("parsing engine settings from '{}'", toml_path.display()))
}

fn parse_config(raw: &str) -> Result<EngineConfig> {
    let file: ConfigFile = toml::from_str(raw)?;
    Ok(file.engine.sanitized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = parse_config("[engine]\ntyping_delay = 0.05\n").unwrap();
        assert!((config.typing_delay - 0.05).abs() < f32::EPSILON);
        assert!((config.fade_duration - 0.25).abs() < f32::EPSILON);
        assert!(config.lock_during_load);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse_config("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn invalid_values_are_replaced() {
        let config = parse_config("[engine]\ntick_seconds = 0.0\nsettle_limit = 0\nfade_duration = -1.0\n").unwrap();
        let defaults = EngineConfig::default();
        assert!((config.tick_seconds - defaults.tick_seconds).abs() < f32::EPSILON);
        assert_eq!(config.settle_limit, defaults.settle_limit);
        assert!((config.fade_duration - defaults.fade_duration).abs() < f32::EPSILON);
    }

    #[test]
    fn unreadable_file_falls_back() {
        let config = load_config(Path::new("definitely/not/here/courier.toml"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_config("[engine\n").is_err());
    }
}
