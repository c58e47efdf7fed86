//! Cooperative cancellation for pipeline workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation token handed to each worker at construction.
///
/// Workers observe the token at every bounded wait; cancellation takes
/// effect between iterations, never mid-classification or mid-flush.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    /// Creates a new, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = ShutdownToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_is_visible_to_clones() {
        let token = ShutdownToken::new();
        let clone = token.clone();

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let token = ShutdownToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_visible_across_threads() {
        let token = ShutdownToken::new();
        let clone = token.clone();

        let handle = std::thread::spawn(move || {
            while !clone.is_cancelled() {
                std::thread::yield_now();
            }
        });

        token.cancel();
        handle.join().unwrap();
    }
}
