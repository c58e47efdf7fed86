//! Batched, single-writer persistence of detections to SQLite.
//!
//! The writer owns the only database connection. Detections are buffered
//! in memory and committed in one transaction per batch, triggered by
//! batch size, flush interval, or shutdown — whichever comes first. A
//! failed commit retains the batch for the next attempt (at-least-once).

use crate::db::detection::Detection;
use crate::defaults;
use crate::error::Result;
use crate::pipeline::shutdown::ShutdownToken;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use rusqlite::{Connection, params};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS detections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp_utc TEXT NOT NULL,
        chunk_start_sec REAL NOT NULL,
        chunk_end_sec REAL NOT NULL,
        species TEXT NOT NULL,
        confidence REAL NOT NULL
    )";

const INSERT_DETECTION: &str = "
    INSERT INTO detections (timestamp_utc, chunk_start_sec, chunk_end_sec, species, confidence)
    VALUES (?1, ?2, ?3, ?4, ?5)";

/// Configuration for the detection writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Detections accumulated before a batch commit.
    pub batch_size: usize,
    /// Maximum time between commits while detections are buffered.
    pub flush_interval: Duration,
    /// Timeout for each wait on the detection queue.
    pub poll_timeout: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::BATCH_SIZE,
            flush_interval: Duration::from_secs(defaults::FLUSH_INTERVAL_SECS),
            poll_timeout: defaults::WRITER_POLL,
        }
    }
}

/// Single-writer detection persistence worker.
pub struct DetectionWriter {
    conn: Connection,
    config: WriterConfig,
    buffer: Vec<Detection>,
}

impl DetectionWriter {
    /// Opens (or creates) the database and ensures the schema exists.
    ///
    /// Errors propagate to the caller: the pipeline must not start
    /// capturing if it cannot record results.
    pub fn open(path: &Path, config: WriterConfig) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(10))?;
        conn.execute(CREATE_TABLE, [])?;
        tracing::info!("database {} initialized", path.display());

        Ok(Self {
            conn,
            config,
            buffer: Vec::new(),
        })
    }

    /// Starts the writer loop on a dedicated thread.
    ///
    /// The loop drains `rx` until the token is cancelled or every sender is
    /// dropped, then flushes any remaining buffered detections exactly once
    /// before releasing the connection.
    pub fn spawn(self, rx: Receiver<Detection>, token: ShutdownToken) -> JoinHandle<()> {
        thread::spawn(move || self.run(rx, token))
    }

    fn run(mut self, rx: Receiver<Detection>, token: ShutdownToken) {
        tracing::info!("detection writer started");
        let mut last_flush = Instant::now();

        while !token.is_cancelled() {
            match rx.recv_timeout(self.config.poll_timeout) {
                Ok(detection) => {
                    tracing::debug!("buffering detection: {}", detection);
                    self.buffer.push(detection);
                    if self.buffer.len() >= self.config.batch_size {
                        self.flush();
                        last_flush = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.buffer.is_empty() && last_flush.elapsed() >= self.config.flush_interval
                    {
                        self.flush();
                        last_flush = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // Final drain and flush; anything lost here must be loud.
        while let Ok(detection) = rx.try_recv() {
            self.buffer.push(detection);
        }
        if !self.buffer.is_empty() {
            match self.write_batch() {
                Ok(written) => {
                    tracing::info!("flushed {} remaining detections on shutdown", written);
                    self.buffer.clear();
                }
                Err(e) => {
                    tracing::error!(
                        "lost {} unflushed detections on shutdown: {}",
                        self.buffer.len(),
                        e
                    );
                }
            }
        }
        tracing::info!("detection writer stopped");
    }

    /// Commits the buffered batch, retaining it on failure for the next
    /// flush trigger.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        match self.write_batch() {
            Ok(written) => {
                tracing::debug!("wrote {} detections to database", written);
                self.buffer.clear();
            }
            Err(e) => {
                tracing::error!(
                    "failed to write batch of {} detections, retrying on next flush: {}",
                    self.buffer.len(),
                    e
                );
            }
        }
    }

    /// Writes the whole buffer in a single transaction.
    fn write_batch(&mut self) -> rusqlite::Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_DETECTION)?;
            for detection in &self.buffer {
                stmt.execute(params![
                    detection.timestamp_utc.to_rfc3339(),
                    detection.chunk_start_sec,
                    detection.chunk_end_sec,
                    detection.species,
                    detection.confidence,
                ])?;
            }
        }
        tx.commit()?;
        Ok(self.buffer.len())
    }
}
