use crate::defaults;
use crate::error::{BirdwatchError, Result};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    ///
    /// # Returns
    /// Ok(()) if the source started successfully, or an error
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    ///
    /// # Returns
    /// Ok(()) if the source stopped successfully, or an error
    fn stop(&mut self) -> Result<()>;

    /// Read all mono samples accumulated since the last read.
    ///
    /// # Returns
    /// Vector of 32-bit float audio samples, or an error
    fn read_samples(&mut self) -> Result<Vec<f32>>;
}

/// Configuration for audio source initialization
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub blocksize: u32,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            blocksize: defaults::BLOCKSIZE,
        }
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<f32>,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0.0; 160],
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return specific samples on every read
    pub fn with_samples(mut self, samples: Vec<f32>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(BirdwatchError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<f32>> {
        if self.should_fail_read {
            Err(BirdwatchError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            Ok(self.samples.clone())
        }
    }
}
