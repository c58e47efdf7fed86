//! Staging of completed chunks to transient WAV files.
//!
//! A completed chunk is serialized to a uniquely named WAV file so the
//! external classifier can read it. The returned handle owns the path;
//! whoever holds the handle is responsible for removing the file.

use crate::error::{BirdwatchError, Result};
use crate::pipeline::accumulator::AudioChunk;
use std::fs;
use std::path::{Path, PathBuf};

/// Handle to a chunk persisted for classification.
///
/// Ownership transfers to the dispatcher on enqueue; the dispatcher removes
/// the underlying file exactly once after classification, success or failure.
#[derive(Debug)]
pub struct StagedChunk {
    path: PathBuf,
    /// Start of the chunk in absolute stream seconds.
    start_sec: f64,
    /// Duration of the chunk in seconds.
    duration_sec: f64,
}

impl StagedChunk {
    /// Path to the staged WAV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start of the chunk in absolute stream seconds.
    pub fn start_sec(&self) -> f64 {
        self.start_sec
    }

    /// Duration of the chunk in seconds.
    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    /// Removes the staged file.
    pub fn remove(&self) -> std::io::Result<()> {
        fs::remove_file(&self.path)
    }
}

/// Serializes chunks into a transient directory.
pub struct ChunkStager {
    dir: PathBuf,
    sample_rate: u32,
}

impl ChunkStager {
    /// Creates a stager writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            dir: dir.into(),
            sample_rate,
        }
    }

    /// Writes the chunk to a uniquely named WAV file and returns its handle.
    ///
    /// On failure the partially written file is removed and the chunk is
    /// lost; callers log and continue.
    pub fn stage(&self, chunk: AudioChunk) -> Result<StagedChunk> {
        let file = tempfile::Builder::new()
            .prefix("chunk-")
            .suffix(".wav")
            .tempfile_in(&self.dir)
            .map_err(|e| BirdwatchError::Staging {
                message: format!("could not create staging file: {}", e),
            })?;
        let path = file
            .into_temp_path()
            .keep()
            .map_err(|e| BirdwatchError::Staging {
                message: format!("could not persist staging file: {}", e),
            })?;

        let start_sec = chunk.start_sec(self.sample_rate);
        let duration_sec = chunk.duration_sec(self.sample_rate);

        if let Err(e) = self.write_wav(&path, &chunk.samples) {
            let _ = fs::remove_file(&path);
            return Err(BirdwatchError::Staging {
                message: format!("could not write {}: {}", path.display(), e),
            });
        }

        Ok(StagedChunk {
            path,
            start_sec,
            duration_sec,
        })
    }

    fn write_wav(&self, path: &Path, samples: &[f32]) -> hound::Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(samples: Vec<f32>, start_sample: u64) -> AudioChunk {
        AudioChunk {
            samples,
            start_sample,
        }
    }

    #[test]
    fn test_stage_writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let stager = ChunkStager::new(dir.path(), 1000);

        let samples = vec![0.0f32, 0.25, -0.5, 1.0];
        let staged = stager.stage(make_chunk(samples.clone(), 0)).unwrap();

        assert!(staged.path().exists());

        let mut reader = hound::WavReader::open(staged.path()).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 1000);
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);

        let read_back: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read_back, samples);
    }

    #[test]
    fn test_stage_computes_absolute_timing() {
        let dir = tempfile::tempdir().unwrap();
        let stager = ChunkStager::new(dir.path(), 500);

        let staged = stager.stage(make_chunk(vec![0.0; 1000], 2500)).unwrap();
        assert_eq!(staged.start_sec(), 5.0);
        assert_eq!(staged.duration_sec(), 2.0);
    }

    #[test]
    fn test_staged_files_have_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let stager = ChunkStager::new(dir.path(), 1000);

        let a = stager.stage(make_chunk(vec![0.0; 10], 0)).unwrap();
        let b = stager.stage(make_chunk(vec![0.0; 10], 10)).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().exists());
        assert!(b.path().exists());
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let stager = ChunkStager::new(dir.path(), 1000);

        let staged = stager.stage(make_chunk(vec![0.0; 10], 0)).unwrap();
        let path = staged.path().to_path_buf();

        staged.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_stage_into_missing_directory_fails() {
        let stager = ChunkStager::new("/nonexistent/birdwatch-staging", 1000);
        let result = stager.stage(make_chunk(vec![0.0; 10], 0));
        assert!(matches!(result, Err(BirdwatchError::Staging { .. })));
    }
}
