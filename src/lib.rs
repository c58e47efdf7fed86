//! birdwatch - Continuous bird song detection and logging
//!
//! Captures a live audio stream, slices it into fixed-length chunks,
//! hands each chunk to an external acoustic classifier, and records
//! confident detections to SQLite.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod classify;
pub mod cli;
pub mod config;
pub mod db;
pub mod defaults;
pub mod error;
pub mod pipeline;

// Core traits (source → classify → sink)
pub use audio::recorder::AudioSource;
pub use classify::classifier::{Classifier, Prediction};

// Pipeline
pub use pipeline::pipeline::{Pipeline, PipelineConfig, PipelineHandle};
pub use pipeline::shutdown::ShutdownToken;

// Detection storage
pub use db::detection::Detection;
pub use db::writer::{DetectionWriter, WriterConfig};

// Error handling
pub use error::{BirdwatchError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.0+abc1234"` when git hash is available, `"0.3.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
