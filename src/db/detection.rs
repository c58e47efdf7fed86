//! Detection record produced by the dispatcher and persisted by the writer.

use chrono::{DateTime, Utc};

/// A prediction that cleared the confidence threshold.
///
/// Immutable once created. The interval is in absolute stream seconds;
/// the timestamp records when the detection was produced, not when the
/// audio was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub timestamp_utc: DateTime<Utc>,
    pub chunk_start_sec: f64,
    pub chunk_end_sec: f64,
    pub species: String,
    pub confidence: f32,
}

impl Detection {
    /// Creates a detection stamped with the current UTC time.
    pub fn new(
        species: impl Into<String>,
        confidence: f32,
        chunk_start_sec: f64,
        chunk_end_sec: f64,
    ) -> Self {
        Self {
            timestamp_utc: Utc::now(),
            chunk_start_sec,
            chunk_end_sec,
            species: species.into(),
            confidence,
        }
    }
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.2}) at {:.1}s-{:.1}s",
            self.species, self.confidence, self.chunk_start_sec, self.chunk_end_sec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_current_time() {
        let before = Utc::now();
        let detection = Detection::new("Turdus merula", 0.9, 0.0, 3.0);
        let after = Utc::now();

        assert!(detection.timestamp_utc >= before);
        assert!(detection.timestamp_utc <= after);
    }

    #[test]
    fn test_fields() {
        let detection = Detection::new("Parus major", 0.82, 180.0, 183.0);
        assert_eq!(detection.species, "Parus major");
        assert_eq!(detection.confidence, 0.82);
        assert_eq!(detection.chunk_start_sec, 180.0);
        assert_eq!(detection.chunk_end_sec, 183.0);
    }

    #[test]
    fn test_display() {
        let detection = Detection::new("Parus major", 0.82, 180.0, 183.0);
        assert_eq!(detection.to_string(), "Parus major (0.82) at 180.0s-183.0s");
    }
}
