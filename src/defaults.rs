//! Default configuration constants for birdwatch.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 44.1kHz preserves the high-frequency content of bird song (many species
/// vocalize well above 8kHz) and is natively supported by nearly all
/// capture hardware.
pub const SAMPLE_RATE: u32 = 44_100;

/// Default number of capture channels.
///
/// Classification operates on mono audio; channels beyond the first are
/// discarded rather than mixed.
pub const CHANNELS: u16 = 1;

/// Default capture block size in frames.
pub const BLOCKSIZE: u32 = 1024;

/// Default chunk duration in seconds.
///
/// Three minutes of audio per chunk keeps classifier invocations infrequent
/// while staying small enough to stage and analyze in one pass.
pub const CHUNK_SECONDS: u32 = 180;

/// Default overlap between consecutive chunks, as a fraction of chunk length.
///
/// 0.0 produces disjoint chunks. Positive values retain the trailing portion
/// of each chunk at the head of the next so calls spanning a chunk boundary
/// are not split.
pub const OVERLAP_FRACTION: f32 = 0.0;

/// Default confidence threshold for recording a detection.
///
/// Predictions must strictly exceed this value to be persisted.
pub const DETECTION_THRESHOLD: f32 = 0.7;

/// Default database file path, relative to the working directory.
pub const DATABASE_PATH: &str = "birdwatch.db";

/// Default number of detections accumulated before a batch commit.
pub const BATCH_SIZE: usize = 100;

/// Default maximum seconds between commits while detections are buffered.
pub const FLUSH_INTERVAL_SECS: u64 = 30;

/// Capacity of the staged-chunk queue between capture and the dispatcher.
///
/// Sized for a classifier that occasionally falls behind by several chunks.
/// When full, newly staged chunks are dropped and logged rather than
/// blocking capture.
pub const STAGED_QUEUE_SIZE: usize = 8;

/// Interval at which the capture thread polls the sample buffer.
pub const CAPTURE_POLL: Duration = Duration::from_millis(25);

/// Timeout for the dispatcher's wait on the staged-chunk queue.
///
/// Bounds how long a shutdown request can go unobserved while idle.
pub const DISPATCH_POLL: Duration = Duration::from_millis(200);

/// Timeout for the writer's wait on the detection queue.
pub const WRITER_POLL: Duration = Duration::from_secs(1);

/// How long shutdown waits for staged chunks to finish classification.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for each worker thread to exit.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(5);
