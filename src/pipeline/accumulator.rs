//! Fixed-length chunk accumulation from incoming sample frames.
//!
//! Accumulates mono samples into chunks of exactly `chunk_samples` length,
//! with optional overlap between consecutive chunks. Pure computation over
//! a fixed-capacity buffer: no I/O, no locks, no waiting, so it is safe to
//! drive from the capture path.

/// A fixed-length chunk of mono audio ready for staging.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Mono samples, always exactly the configured chunk length.
    pub samples: Vec<f32>,
    /// Absolute stream position (sample index) of the first sample.
    pub start_sample: u64,
}

impl AudioChunk {
    /// Start of this chunk in absolute stream seconds.
    pub fn start_sec(&self, sample_rate: u32) -> f64 {
        self.start_sample as f64 / sample_rate as f64
    }

    /// Duration of this chunk in seconds.
    pub fn duration_sec(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / sample_rate as f64
    }
}

/// Accumulates sample frames into fixed-length chunks.
#[derive(Debug)]
pub struct ChunkAccumulator {
    /// Partial chunk under construction; capacity is `chunk_samples`.
    buffer: Vec<f32>,
    chunk_samples: usize,
    overlap_samples: usize,
    /// Absolute stream position of `buffer[0]`.
    chunk_start: u64,
}

impl ChunkAccumulator {
    /// Creates an accumulator emitting chunks of `chunk_samples` samples,
    /// each retaining the trailing `overlap_samples` samples of its
    /// predecessor. The overlap is clamped below the chunk length.
    pub fn new(chunk_samples: usize, overlap_samples: usize) -> Self {
        let overlap_samples = overlap_samples.min(chunk_samples.saturating_sub(1));
        Self {
            buffer: Vec::with_capacity(chunk_samples),
            chunk_samples,
            overlap_samples,
            chunk_start: 0,
        }
    }

    /// Number of samples currently buffered toward the next chunk.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true when no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured chunk length in samples.
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    /// Pushes a frame of samples, returning every chunk completed by it.
    ///
    /// Emission loops over the frame: a frame longer than the remaining
    /// buffer space can complete several chunks in one call, in stream
    /// order.
    pub fn push(&mut self, frame: &[f32]) -> Vec<AudioChunk> {
        let mut emitted = Vec::new();
        let mut rest = frame;

        while !rest.is_empty() {
            let space = self.chunk_samples - self.buffer.len();
            let take = space.min(rest.len());
            self.buffer.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.buffer.len() == self.chunk_samples {
                emitted.push(AudioChunk {
                    samples: self.buffer.clone(),
                    start_sample: self.chunk_start,
                });
                self.chunk_start += (self.chunk_samples - self.overlap_samples) as u64;

                if self.overlap_samples > 0 {
                    self.buffer
                        .copy_within(self.chunk_samples - self.overlap_samples.., 0);
                    self.buffer.truncate(self.overlap_samples);
                } else {
                    self.buffer.clear();
                }
            }
        }

        emitted
    }
}
