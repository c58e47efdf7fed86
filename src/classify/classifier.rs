use crate::error::{BirdwatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One species prediction for a sub-interval of a chunk.
///
/// Intervals are in seconds relative to the start of the chunk file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub species: String,
    pub confidence: f32,
    pub start_sec: f32,
    pub end_sec: f32,
}

impl Prediction {
    /// Validates the prediction at the classifier boundary.
    ///
    /// Everything downstream may assume a validated prediction: non-empty
    /// species, finite confidence in [0, 1], and a non-inverted interval.
    pub fn validate(&self) -> Result<()> {
        if self.species.is_empty() {
            return Err(invalid("empty species label"));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(invalid(&format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        if !self.start_sec.is_finite() || !self.end_sec.is_finite() || self.start_sec < 0.0 {
            return Err(invalid("interval bounds must be finite and non-negative"));
        }
        if self.end_sec < self.start_sec {
            return Err(invalid(&format!(
                "inverted interval ({}, {})",
                self.start_sec, self.end_sec
            )));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> BirdwatchError {
    BirdwatchError::Classification {
        message: format!("invalid prediction: {}", message),
    }
}

/// Trait for acoustic species classification.
///
/// This trait allows swapping implementations (real analyzer vs mock).
/// One synchronous call per staged chunk; the call may take several seconds.
pub trait Classifier: Send + Sync {
    /// Classify the audio file at `audio_path`.
    ///
    /// # Returns
    /// Validated predictions for sub-intervals of the chunk, or an error.
    /// An empty vector is a normal result (nothing recognized).
    fn classify(&self, audio_path: &Path) -> Result<Vec<Prediction>>;

    /// Get the name of the classifier backend
    fn name(&self) -> &str;
}

/// Implement Classifier for Arc<T> to allow sharing across workers.
impl<T: Classifier> Classifier for Arc<T> {
    fn classify(&self, audio_path: &Path) -> Result<Vec<Prediction>> {
        (**self).classify(audio_path)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock classifier for testing
#[derive(Debug, Clone)]
pub struct MockClassifier {
    predictions: Vec<Prediction>,
    should_fail: bool,
}

impl MockClassifier {
    /// Create a new mock classifier returning no predictions
    pub fn new() -> Self {
        Self {
            predictions: Vec::new(),
            should_fail: false,
        }
    }

    /// Configure the mock to return specific predictions for every chunk
    pub fn with_predictions(mut self, predictions: Vec<Prediction>) -> Self {
        self.predictions = predictions;
        self
    }

    /// Configure the mock to fail on classify
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _audio_path: &Path) -> Result<Vec<Prediction>> {
        if self.should_fail {
            Err(BirdwatchError::Classification {
                message: "mock classification failure".to_string(),
            })
        } else {
            Ok(self.predictions.clone())
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
