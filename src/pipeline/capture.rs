//! Capture polling thread: audio source → accumulator → staging → queue.
//!
//! The real-time stream callback only appends samples to the source's
//! internal buffer; this thread drains that buffer, accumulates chunks,
//! stages them to disk, and hands references to the dispatcher. Staging
//! never back-pressures the stream callback — at worst the source buffer
//! grows while a chunk is written.

use crate::audio::recorder::AudioSource;
use crate::error::Result;
use crate::pipeline::accumulator::{AudioChunk, ChunkAccumulator};
use crate::pipeline::shutdown::ShutdownToken;
use crate::pipeline::staging::{ChunkStager, StagedChunk};
use crossbeam_channel::{Sender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Capture worker feeding the staged-chunk queue.
pub struct CaptureStation<A: AudioSource> {
    source: A,
    accumulator: ChunkAccumulator,
    stager: ChunkStager,
    poll_interval: Duration,
}

impl<A: AudioSource + 'static> CaptureStation<A> {
    pub fn new(
        source: A,
        accumulator: ChunkAccumulator,
        stager: ChunkStager,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            accumulator,
            stager,
            poll_interval,
        }
    }

    /// Starts the audio source and spawns the polling thread.
    ///
    /// Start failures propagate to the caller; nothing is spawned in that
    /// case. Enqueueing is non-blocking: when the staged-chunk queue is
    /// full the chunk is dropped and logged, never awaited.
    pub fn start(
        mut self,
        staged_tx: Sender<StagedChunk>,
        token: ShutdownToken,
    ) -> Result<JoinHandle<()>> {
        self.source.start()?;
        tracing::info!("audio capture started");

        let handle = thread::spawn(move || {
            while !token.is_cancelled() {
                match self.source.read_samples() {
                    Ok(samples) if !samples.is_empty() => {
                        for chunk in self.accumulator.push(&samples) {
                            self.stage_and_enqueue(chunk, &staged_tx);
                        }
                        thread::sleep(self.poll_interval);
                    }
                    Ok(_) => thread::sleep(self.poll_interval),
                    Err(e) => {
                        // Transient capture anomaly: log and keep polling
                        tracing::warn!("audio read error: {}", e);
                        thread::sleep(self.poll_interval);
                    }
                }
            }

            if let Err(e) = self.source.stop() {
                tracing::warn!("audio source stop failed: {}", e);
            }
            if !self.accumulator.is_empty() {
                // Residual samples below one chunk length are dropped
                tracing::debug!(
                    "discarding {} residual samples on shutdown",
                    self.accumulator.len()
                );
            }
            tracing::info!("audio capture stopped");
        });

        Ok(handle)
    }

    fn stage_and_enqueue(&self, chunk: AudioChunk, staged_tx: &Sender<StagedChunk>) {
        let staged = match self.stager.stage(chunk) {
            Ok(staged) => staged,
            Err(e) => {
                // One lost chunk is preferable to stalling capture
                tracing::warn!("dropping chunk: {}", e);
                return;
            }
        };

        match staged_tx.try_send(staged) {
            Ok(()) => {}
            Err(TrySendError::Full(staged)) => {
                tracing::warn!(
                    "staged-chunk queue full, dropping chunk at {:.1}s",
                    staged.start_sec()
                );
                let _ = staged.remove();
            }
            Err(TrySendError::Disconnected(staged)) => {
                tracing::warn!("staged-chunk queue closed, dropping chunk");
                let _ = staged.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::MockAudioSource;
    use crossbeam_channel::bounded;
    use std::time::Instant;

    fn make_station(source: MockAudioSource, chunk_samples: usize, dir: &std::path::Path) -> CaptureStation<MockAudioSource> {
        CaptureStation::new(
            source,
            ChunkAccumulator::new(chunk_samples, 0),
            ChunkStager::new(dir, 1000),
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_start_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let station = make_station(MockAudioSource::new().with_start_failure(), 100, dir.path());

        let (staged_tx, _staged_rx) = bounded(4);
        let result = station.start(staged_tx, ShutdownToken::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_chunks_flow_to_queue() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockAudioSource::new().with_samples(vec![0.1f32; 60]);
        let station = make_station(source, 100, dir.path());

        let (staged_tx, staged_rx) = bounded(16);
        let token = ShutdownToken::new();
        let handle = station.start(staged_tx, token.clone()).unwrap();

        let first = staged_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = staged_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(first.path().exists());
        assert_eq!(first.start_sec(), 0.0);
        // 100 samples at 1kHz per chunk, disjoint
        assert_eq!(second.start_sec(), 0.1);

        token.cancel();
        handle.join().unwrap();

        let _ = first.remove();
        let _ = second.remove();
    }

    #[test]
    fn test_full_queue_drops_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockAudioSource::new().with_samples(vec![0.1f32; 100]);
        let station = make_station(source, 100, dir.path());

        // Capacity 1 and nobody consuming: everything past the first chunk
        // must be dropped and its file removed.
        let (staged_tx, staged_rx) = bounded(1);
        let token = ShutdownToken::new();
        let handle = station.start(staged_tx, token.clone()).unwrap();

        thread::sleep(Duration::from_millis(200));
        token.cancel();
        handle.join().unwrap();

        let queued = staged_rx.try_recv().unwrap();
        assert!(queued.path().exists());
        queued.remove().unwrap();

        // Only the queued chunk's file may remain on disk
        let leftover = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_read_errors_do_not_stop_worker() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockAudioSource::new().with_read_failure();
        let station = make_station(source, 100, dir.path());

        let (staged_tx, _staged_rx) = bounded(4);
        let token = ShutdownToken::new();
        let handle = station.start(staged_tx, token.clone()).unwrap();

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        token.cancel();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        handle.join().unwrap();
    }

    #[test]
    fn test_cancel_stops_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = MockAudioSource::new().with_samples(vec![]);
        let station = make_station(source, 100, dir.path());

        let (staged_tx, _staged_rx) = bounded(4);
        let token = ShutdownToken::new();
        let handle = station.start(staged_tx, token.clone()).unwrap();

        token.cancel();
        handle.join().unwrap();
    }
}
