//! Classifier adapter invoking an external analyzer command.
//!
//! The analyzer is called once per staged chunk with the WAV path as its
//! final argument and must print a JSON array of predictions to stdout:
//!
//! ```json
//! [{"species": "Turdus merula", "confidence": 0.91, "start_sec": 0.0, "end_sec": 3.0}]
//! ```

use crate::classify::classifier::{Classifier, Prediction};
use crate::error::{BirdwatchError, Result};
use std::path::Path;
use std::process::Command;

/// Classifier that shells out to a configured analyzer command.
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    /// Creates an adapter for `program`, invoked as
    /// `program [args...] <chunk.wav>`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Classifier for CommandClassifier {
    fn classify(&self, audio_path: &Path) -> Result<Vec<Prediction>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(audio_path)
            .output()
            .map_err(|e| BirdwatchError::Classification {
                message: format!("could not run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BirdwatchError::Classification {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        let predictions: Vec<Prediction> =
            serde_json::from_slice(&output.stdout).map_err(|e| BirdwatchError::Classification {
                message: format!("unparseable analyzer output: {}", e),
            })?;

        for prediction in &predictions {
            prediction.validate()?;
        }

        Ok(predictions)
    }

    fn name(&self) -> &str {
        &self.program
    }
}
