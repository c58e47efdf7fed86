//! Pipeline lifecycle: ordered startup and graceful, bounded shutdown.
//!
//! Start order: detection writer → chunk dispatcher → capture. Stop order
//! is the reverse of data flow: capture stops first so no new chunks are
//! produced, the staged-chunk queue gets a bounded drain window, the
//! writer performs its final flush, and the dispatcher is joined last.
//! Deadline misses are logged, never escalated.

use crate::audio::recorder::AudioSource;
use crate::classify::classifier::Classifier;
use crate::config::Config;
use crate::db::detection::Detection;
use crate::db::writer::{DetectionWriter, WriterConfig};
use crate::defaults;
use crate::error::Result;
use crate::pipeline::accumulator::ChunkAccumulator;
use crate::pipeline::capture::CaptureStation;
use crate::pipeline::dispatcher::{DispatcherHandle, DispatcherStation};
use crate::pipeline::shutdown::ShutdownToken;
use crate::pipeline::staging::{ChunkStager, StagedChunk};
use crossbeam_channel::{Sender, bounded, unbounded};
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Configuration for the detection pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample rate of the captured audio in Hz.
    pub sample_rate: u32,
    /// Samples per chunk.
    pub chunk_samples: usize,
    /// Samples retained from the tail of each chunk.
    pub overlap_samples: usize,
    /// Confidence threshold for recording a detection.
    pub detection_threshold: f32,
    /// Database file path.
    pub database_path: PathBuf,
    /// Detection writer configuration.
    pub writer: WriterConfig,
    /// Capacity of the staged-chunk queue.
    pub staged_queue_size: usize,
    /// Capture thread polling interval.
    pub capture_poll: Duration,
    /// Dispatcher wait timeout on the staged-chunk queue.
    pub dispatch_poll: Duration,
    /// Shutdown wait for staged chunks to finish classification.
    pub drain_timeout: Duration,
    /// Shutdown wait for each worker thread to exit.
    pub join_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let config = Config::default();
        Self::from_config(&config)
    }
}

impl PipelineConfig {
    /// Derives pipeline settings from the application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            chunk_samples: config.chunk_samples(),
            overlap_samples: config.overlap_samples(),
            detection_threshold: config.detection.threshold,
            database_path: config.database.path.clone(),
            writer: WriterConfig {
                batch_size: config.database.batch_size,
                flush_interval: Duration::from_secs(config.database.flush_interval_secs),
                poll_timeout: defaults::WRITER_POLL,
            },
            staged_queue_size: defaults::STAGED_QUEUE_SIZE,
            capture_poll: defaults::CAPTURE_POLL,
            dispatch_poll: defaults::DISPATCH_POLL,
            drain_timeout: defaults::DRAIN_TIMEOUT,
            join_timeout: defaults::JOIN_TIMEOUT,
        }
    }
}

/// Detection pipeline: capture → staging → classification → storage.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Starts all components in dependency order.
    ///
    /// The database is opened first; a failure there aborts startup before
    /// any capture begins. The returned handle stops everything in reverse
    /// order.
    pub fn start<A, C>(self, audio_source: A, classifier: C) -> Result<PipelineHandle>
    where
        A: AudioSource + 'static,
        C: Classifier + Send + Sync + 'static,
    {
        let writer = DetectionWriter::open(&self.config.database_path, self.config.writer.clone())?;

        let staging_dir = tempfile::tempdir()?;

        let (staged_tx, staged_rx) = bounded::<StagedChunk>(self.config.staged_queue_size);
        let (detection_tx, detection_rx) = unbounded::<Detection>();

        let capture_token = ShutdownToken::new();
        let dispatcher_token = ShutdownToken::new();
        let writer_token = ShutdownToken::new();

        let writer_handle = writer.spawn(detection_rx, writer_token.clone());

        let dispatcher = DispatcherStation::new(classifier, self.config.detection_threshold)
            .with_poll_timeout(self.config.dispatch_poll);
        let dispatcher_handle = dispatcher.spawn(staged_rx, detection_tx, dispatcher_token.clone());

        let capture = CaptureStation::new(
            audio_source,
            ChunkAccumulator::new(self.config.chunk_samples, self.config.overlap_samples),
            ChunkStager::new(staging_dir.path(), self.config.sample_rate),
            self.config.capture_poll,
        );
        let capture_handle = match capture.start(staged_tx.clone(), capture_token.clone()) {
            Ok(handle) => handle,
            Err(e) => {
                // Unwind the already-running workers before reporting
                writer_token.cancel();
                dispatcher_token.cancel();
                let _ = writer_handle.join();
                let _ = dispatcher_handle.join();
                return Err(e);
            }
        };

        tracing::info!("pipeline started");
        Ok(PipelineHandle {
            capture_token,
            dispatcher_token,
            writer_token,
            capture_handle,
            dispatcher_handle,
            writer_handle,
            staged_probe: staged_tx,
            drain_timeout: self.config.drain_timeout,
            join_timeout: self.config.join_timeout,
            _staging_dir: staging_dir,
        })
    }
}

/// Handle to a running pipeline.
pub struct PipelineHandle {
    capture_token: ShutdownToken,
    dispatcher_token: ShutdownToken,
    writer_token: ShutdownToken,
    capture_handle: JoinHandle<()>,
    dispatcher_handle: DispatcherHandle,
    writer_handle: JoinHandle<()>,
    /// Kept for observing queue depth during the shutdown drain.
    staged_probe: Sender<StagedChunk>,
    drain_timeout: Duration,
    join_timeout: Duration,
    /// Staging directory; removed when the handle is dropped, after all
    /// workers have been joined.
    _staging_dir: tempfile::TempDir,
}

impl PipelineHandle {
    /// Returns true while the capture worker is alive.
    pub fn is_running(&self) -> bool {
        !self.capture_handle.is_finished()
    }

    /// Stops the pipeline in reverse dependency order.
    pub fn stop(self) {
        tracing::info!("stopping pipeline");

        // 1. Stop capture so no new chunks are produced.
        self.capture_token.cancel();
        join_with_timeout("capture", self.capture_handle, self.join_timeout);

        // 2. Give in-flight chunks a bounded window to finish classification.
        let deadline = Instant::now() + self.drain_timeout;
        while (self.staged_probe.len() > 0 || self.dispatcher_handle.is_busy())
            && Instant::now() < deadline
        {
            std::thread::sleep(Duration::from_millis(20));
        }
        let unprocessed = self.staged_probe.len();
        if unprocessed > 0 {
            tracing::warn!(
                "staged-chunk queue did not drain within {:?}, {} chunks unprocessed",
                self.drain_timeout,
                unprocessed
            );
        }

        // 3. Stop the writer; its final flush runs before the thread exits.
        self.writer_token.cancel();
        join_with_timeout("detection writer", self.writer_handle, self.join_timeout);

        // 4. Join the dispatcher last.
        self.dispatcher_token.cancel();
        let (dispatcher_handle, _) = self.dispatcher_handle.into_inner();
        join_with_timeout("chunk dispatcher", dispatcher_handle, self.join_timeout);

        tracing::info!("pipeline stopped");
    }
}

/// Joins a worker thread, logging (not failing) if the deadline passes.
fn join_with_timeout(name: &str, handle: JoinHandle<()>, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            tracing::warn!("{} worker did not stop within {:?}", name, timeout);
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    if handle.join().is_err() {
        tracing::warn!("{} worker panicked", name);
    }
}
