use crate::defaults;
use crate::error::{BirdwatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub chunking: ChunkingConfig,
    pub detection: DetectionConfig,
    pub database: DatabaseConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    pub blocksize: u32,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_seconds: u32,
    pub overlap_fraction: f32,
}

/// Detection and classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub threshold: f32,
    /// External analyzer command invoked per staged chunk.
    pub command: Option<String>,
    /// Arguments passed to the analyzer before the chunk path.
    pub args: Vec<String>,
}

/// Detection storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub batch_size: usize,
    pub flush_interval_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            blocksize: defaults::BLOCKSIZE,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_seconds: defaults::CHUNK_SECONDS,
            overlap_fraction: defaults::OVERLAP_FRACTION,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::DETECTION_THRESHOLD,
            command: None,
            args: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::DATABASE_PATH),
            batch_size: defaults::BATCH_SIZE,
            flush_interval_secs: defaults::FLUSH_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - BIRDWATCH_DEVICE → audio.device
    /// - BIRDWATCH_DATABASE → database.path
    /// - BIRDWATCH_CLASSIFIER → detection.command
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("BIRDWATCH_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(path) = std::env::var("BIRDWATCH_DATABASE")
            && !path.is_empty()
        {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(command) = std::env::var("BIRDWATCH_CLASSIFIER")
            && !command.is_empty()
        {
            self.detection.command = Some(command);
        }

        self
    }

    /// Validate configuration values that have hard constraints.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be positive"));
        }
        if self.audio.channels == 0 {
            return Err(invalid("audio.channels", "must be positive"));
        }
        if self.chunking.chunk_seconds == 0 {
            return Err(invalid("chunking.chunk_seconds", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.chunking.overlap_fraction) {
            return Err(invalid(
                "chunking.overlap_fraction",
                "must be at least 0.0 and below 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.threshold) {
            return Err(invalid(
                "detection.threshold",
                "must be between 0.0 and 1.0",
            ));
        }
        if self.database.batch_size == 0 {
            return Err(invalid("database.batch_size", "must be positive"));
        }
        Ok(())
    }

    /// Number of samples in one chunk.
    pub fn chunk_samples(&self) -> usize {
        self.chunking.chunk_seconds as usize * self.audio.sample_rate as usize
    }

    /// Number of samples retained from the tail of each chunk.
    pub fn overlap_samples(&self) -> usize {
        (self.chunking.overlap_fraction as f64 * self.chunk_samples() as f64) as usize
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/birdwatch/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("birdwatch").join("config.toml"))
    }
}

fn invalid(key: &str, message: &str) -> BirdwatchError {
    BirdwatchError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
