//! Detection pipeline: capture → staging → classification → storage.
//!
//! Workers run in dedicated threads connected by crossbeam channels; a
//! bounded queue carries staged-chunk references and an unbounded queue
//! carries detections. Shutdown is cooperative via per-worker tokens.

pub mod accumulator;
pub mod capture;
pub mod dispatcher;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod shutdown;
pub mod staging;

pub use accumulator::{AudioChunk, ChunkAccumulator};
pub use capture::CaptureStation;
pub use dispatcher::{DispatcherHandle, DispatcherStation};
pub use pipeline::{Pipeline, PipelineConfig, PipelineHandle};
pub use shutdown::ShutdownToken;
pub use staging::{ChunkStager, StagedChunk};
