//! Supersede tokens for background re-layout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::engine::CancelToken;

/// Generation counter for one document.
///
/// Each [`begin`](Self::begin) makes every earlier [`GenerationToken`] report
/// cancelled, so at most one layout per document is ever live.
#[derive(Clone, Debug, Default)]
pub struct LayoutGeneration {
    current: Arc<AtomicU64>,
}

impl LayoutGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding all earlier ones.
    pub fn begin(&self) -> GenerationToken {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        GenerationToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Latest generation handed out, 0 before the first `begin`.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Cancel token that trips once a newer generation begins.
#[derive(Clone, Debug)]
pub struct GenerationToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }
}

impl CancelToken for GenerationToken {
    fn is_cancelled(&self) -> bool {
        !self.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_generation_supersedes_older() {
        let generations = LayoutGeneration::new();
        assert_eq!(generations.current(), 0);
        let first = generations.begin();
        assert!(!first.is_cancelled());
        let second = generations.begin();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(second.generation(), 2);
    }

    #[test]
    fn clones_share_the_counter() {
        let generations = LayoutGeneration::new();
        let token = generations.begin();
        let worker_view = generations.clone();
        worker_view.begin();
        assert!(token.is_cancelled());
    }
}
