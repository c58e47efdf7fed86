//! Dispatch of staged chunks to the classifier.
//!
//! A single worker thread pulls staged chunks in FIFO order, classifies
//! one chunk at a time, filters predictions by confidence, and enqueues
//! the surviving detections for the writer. The staged file is removed
//! exactly once per chunk, whether or not classification succeeded.

use crate::classify::classifier::Classifier;
use crate::db::detection::Detection;
use crate::defaults;
use crate::pipeline::shutdown::ShutdownToken;
use crate::pipeline::staging::StagedChunk;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handle to a running dispatcher worker.
pub struct DispatcherHandle {
    handle: JoinHandle<()>,
    busy: Arc<AtomicBool>,
}

impl DispatcherHandle {
    /// Returns true while a chunk is being classified.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Waits for the worker thread to exit.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }

    pub(crate) fn into_inner(self) -> (JoinHandle<()>, Arc<AtomicBool>) {
        (self.handle, self.busy)
    }
}

/// Worker that classifies staged chunks and filters detections.
pub struct DispatcherStation<C: Classifier> {
    classifier: Arc<C>,
    threshold: f32,
    poll_timeout: Duration,
}

impl<C: Classifier + Send + Sync + 'static> DispatcherStation<C> {
    /// Creates a dispatcher keeping predictions whose confidence strictly
    /// exceeds `threshold`.
    pub fn new(classifier: C, threshold: f32) -> Self {
        Self {
            classifier: Arc::new(classifier),
            threshold,
            poll_timeout: defaults::DISPATCH_POLL,
        }
    }

    /// Overrides the bounded wait on the staged-chunk queue.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// Starts the worker on a dedicated thread.
    ///
    /// The worker loops until the token is cancelled or the staged-chunk
    /// queue disconnects; cancellation is observed at each bounded wait.
    pub fn spawn(
        self,
        staged_rx: Receiver<StagedChunk>,
        detection_tx: Sender<Detection>,
        token: ShutdownToken,
    ) -> DispatcherHandle {
        let busy = Arc::new(AtomicBool::new(false));
        let busy_flag = busy.clone();

        let handle = thread::spawn(move || {
            tracing::info!("chunk dispatcher started ({})", self.classifier.name());

            while !token.is_cancelled() {
                match staged_rx.recv_timeout(self.poll_timeout) {
                    Ok(staged) => {
                        busy_flag.store(true, Ordering::SeqCst);
                        self.process(staged, &detection_tx);
                        busy_flag.store(false, Ordering::SeqCst);
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            tracing::info!("chunk dispatcher stopped");
        });

        DispatcherHandle { handle, busy }
    }

    /// Classifies one staged chunk and enqueues qualifying detections.
    ///
    /// Classification errors are contained here: the chunk is skipped, its
    /// file is removed, and the worker keeps running.
    fn process(&self, staged: StagedChunk, detection_tx: &Sender<Detection>) {
        tracing::debug!(
            "classifying chunk at {:.1}s ({})",
            staged.start_sec(),
            staged.path().display()
        );

        match self.classifier.classify(staged.path()) {
            Ok(predictions) => {
                let mut kept = 0;
                for prediction in predictions {
                    if prediction.confidence <= self.threshold {
                        tracing::debug!(
                            "below threshold: {} ({:.2})",
                            prediction.species,
                            prediction.confidence
                        );
                        continue;
                    }

                    let detection = Detection::new(
                        prediction.species,
                        prediction.confidence,
                        staged.start_sec() + prediction.start_sec as f64,
                        staged.start_sec() + prediction.end_sec as f64,
                    );
                    tracing::info!("detected {}", detection);

                    if detection_tx.send(detection).is_err() {
                        tracing::warn!("detection queue closed, dropping detection");
                    } else {
                        kept += 1;
                    }
                }
                if kept == 0 {
                    tracing::debug!(
                        "no detections above threshold for chunk at {:.1}s",
                        staged.start_sec()
                    );
                }
            }
            Err(e) => {
                tracing::warn!("classification failed for chunk at {:.1}s: {}", staged.start_sec(), e);
            }
        }

        if let Err(e) = staged.remove() {
            tracing::warn!("could not remove staged chunk {}: {}", staged.path().display(), e);
        }
    }
}
