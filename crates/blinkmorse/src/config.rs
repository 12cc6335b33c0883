//! Configuration management for blinkmorse.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::decoder::{AmbiguousPolicy, BoundaryPolicy, DecoderConfig};
use crate::detector::DetectorConfig;
use crate::error::{Error, Result};
use crate::source::{BlinkSignal, Calibration};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "blinkmorse";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "BLINKMORSE_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BLINKMORSE_`, sections separated
///    by `__`, e.g. `BLINKMORSE_TIMING__DOT_MAX_MS=400`)
/// 2. TOML config file at `~/.config/blinkmorse/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Blink timing thresholds.
    pub timing: TimingConfig,
    /// Decoding policies.
    pub decoding: DecodingConfig,
    /// Face detection calibration.
    pub detection: DetectionConfig,
}

/// Timing thresholds, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval between samples of the blink signal.
    pub sample_interval_ms: u64,
    /// Blinks shorter than this are dots.
    pub dot_max_ms: u64,
    /// Blinks longer than this are dashes.
    pub dash_min_ms: u64,
    /// Blinks are force-closed after this long.
    pub max_blink_ms: u64,
    /// Open-eye pause that ends a letter.
    pub letter_gap_ms: u64,
    /// Open-eye pause that ends a word. Set to 0 to disable word breaks.
    pub word_gap_ms: u64,
}

/// Decoding policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingConfig {
    /// What to do with blinks between the dot and dash thresholds.
    pub ambiguous: AmbiguousPolicy,
    /// When a letter is committed.
    pub boundary: BoundaryPolicy,
}

/// Face detection calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Face boxes at or below this height count as no face.
    pub min_face_height: f64,
    /// Which visibility change marks a blink.
    pub blink_signal: BlinkSignal,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 200,
            dot_max_ms: 500,
            dash_min_ms: 1000,
            max_blink_ms: 1500,
            letter_gap_ms: 2000,
            word_gap_ms: 4000,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_face_height: 50.0,
            blink_signal: BlinkSignal::FaceLost,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;

        if timing.sample_interval_ms == 0 {
            return Err(Error::config_validation(
                "sample_interval_ms must be greater than 0",
            ));
        }

        if timing.dot_max_ms > timing.dash_min_ms {
            return Err(Error::config_validation(format!(
                "dot_max_ms ({}) cannot be greater than dash_min_ms ({})",
                timing.dot_max_ms, timing.dash_min_ms
            )));
        }

        if timing.max_blink_ms <= timing.dash_min_ms {
            return Err(Error::config_validation(format!(
                "max_blink_ms ({}) must be greater than dash_min_ms ({})",
                timing.max_blink_ms, timing.dash_min_ms
            )));
        }

        if self.decoding.boundary == BoundaryPolicy::Gap && timing.letter_gap_ms == 0 {
            return Err(Error::config_validation(
                "letter_gap_ms must be greater than 0 when boundary = \"gap\"",
            ));
        }

        if timing.word_gap_ms != 0 && timing.word_gap_ms <= timing.letter_gap_ms {
            return Err(Error::config_validation(format!(
                "word_gap_ms ({}) must be greater than letter_gap_ms ({}) or 0",
                timing.word_gap_ms, timing.letter_gap_ms
            )));
        }

        let height = self.detection.min_face_height;
        if !height.is_finite() || height < 0.0 {
            return Err(Error::config_validation(format!(
                "min_face_height must be a non-negative number, got {height}"
            )));
        }

        Ok(())
    }

    /// Get the sample interval as a Duration.
    #[must_use]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.timing.sample_interval_ms)
    }

    /// Get the word gap as a Duration, if word breaks are enabled.
    #[must_use]
    pub fn word_gap(&self) -> Option<Duration> {
        if self.timing.word_gap_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timing.word_gap_ms))
        }
    }

    /// Build decoder settings.
    #[must_use]
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            dot_max: Duration::from_millis(self.timing.dot_max_ms),
            dash_min: Duration::from_millis(self.timing.dash_min_ms),
            max_blink: Duration::from_millis(self.timing.max_blink_ms),
            letter_gap: Duration::from_millis(self.timing.letter_gap_ms),
            word_gap: self.word_gap(),
            ambiguous: self.decoding.ambiguous,
            boundary: self.decoding.boundary,
        }
    }

    /// Build face calibration settings.
    #[must_use]
    pub fn calibration(&self) -> Calibration {
        Calibration {
            min_face_height: self.detection.min_face_height,
            blink_signal: self.detection.blink_signal,
        }
    }

    /// Build detector settings.
    #[must_use]
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            sample_interval: self.sample_interval(),
            decoder: self.decoder_config(),
            calibration: self.calibration(),
        }
    }
}
