//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Build pipeline configuration
    #[serde(default)]
    pub build: BuildConfig,

    /// Synthesis backend configuration
    #[serde(default)]
    pub tts: TtsConfig,

    /// Silence trimming configuration
    #[serde(default)]
    pub trim: TrimConfig,
}

impl Settings {
    /// Load settings from an optional TOML file plus `AUTOPOD_*`
    /// environment overrides. Every field has a default, so both sources
    /// are optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("AUTOPOD").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.max_concurrent_generations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "build.max_concurrent_generations".to_string(),
                message: "at least one synthesis worker is required".to_string(),
            });
        }
        if self.build.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "build.queue_capacity".to_string(),
                message: "queue capacity must be at least 1".to_string(),
            });
        }
        if self.trim.step_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "trim.step_ms".to_string(),
                message: "trim step must be at least 1ms".to_string(),
            });
        }
        if self.trim.window_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "trim.window_ms".to_string(),
                message: "trim window must be at least 1ms".to_string(),
            });
        }
        Ok(())
    }
}

/// Build pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Number of concurrent synthesis workers
    #[serde(default = "default_max_concurrent_generations")]
    pub max_concurrent_generations: usize,

    /// Capacity of the work queue between the producer and the workers;
    /// segment production suspends once this many items are pending
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Directory for per-segment artifacts, the manifest, and logs
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Remove a pre-existing temp directory before building; when false,
    /// stale artifacts from a previous run are overwritten slot by slot
    #[serde(default)]
    pub clear_temp_dir: bool,

    /// Concatenation tool binary
    #[serde(default = "default_ffmpeg_bin")]
    pub ffmpeg_bin: String,
}

fn default_max_concurrent_generations() -> usize {
    5
}
fn default_queue_capacity() -> usize {
    100
}
fn default_temp_dir() -> PathBuf {
    PathBuf::from("./temp")
}
fn default_ffmpeg_bin() -> String {
    "ffmpeg".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_concurrent_generations: default_max_concurrent_generations(),
            queue_capacity: default_queue_capacity(),
            temp_dir: default_temp_dir(),
            clear_temp_dir: false,
            ffmpeg_bin: default_ffmpeg_bin(),
        }
    }
}

/// Synthesis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Voice used when the content provider does not pick one
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Sample rate of the backend's PCM output
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_voice() -> String {
    "en-GB-SoniaNeural".to_string()
}
fn default_sample_rate() -> u32 {
    24_000
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Silence trimming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimConfig {
    /// Loudness measurement window (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: u32,

    /// Stride between measurements (ms)
    #[serde(default = "default_step_ms")]
    pub step_ms: u32,

    /// Windows quieter than this are considered silence (dBFS)
    #[serde(default = "default_threshold_dbfs")]
    pub threshold_dbfs: f64,
}

fn default_window_ms() -> u32 {
    50
}
fn default_step_ms() -> u32 {
    20
}
fn default_threshold_dbfs() -> f64 {
    -50.0
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            step_ms: default_step_ms(),
            threshold_dbfs: default_threshold_dbfs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.build.max_concurrent_generations, 5);
        assert_eq!(settings.build.queue_capacity, 100);
        assert_eq!(settings.build.temp_dir, PathBuf::from("./temp"));
        assert!(!settings.build.clear_temp_dir);
        assert_eq!(settings.tts.default_voice, "en-GB-SoniaNeural");
        assert_eq!(settings.trim.window_ms, 50);
        assert_eq!(settings.trim.step_ms, 20);
        assert_eq!(settings.trim.threshold_dbfs, -50.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.build.max_concurrent_generations, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[build]\nmax_concurrent_generations = 2\nqueue_capacity = 10\n\n[trim]\nthreshold_dbfs = -40.0"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.build.max_concurrent_generations, 2);
        assert_eq!(settings.build.queue_capacity, 10);
        assert_eq!(settings.trim.threshold_dbfs, -40.0);
        // Untouched sections keep their defaults.
        assert_eq!(settings.tts.sample_rate, 24_000);
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut settings = Settings::default();
        settings.build.max_concurrent_generations = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_trim_step() {
        let mut settings = Settings::default();
        settings.trim.step_ms = 0;
        assert!(settings.validate().is_err());
    }
}
