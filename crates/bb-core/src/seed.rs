//! Randomization seeds for sequential generation runs
//!
//! Each engine invocation takes the current seed and advances the counter by
//! one, so repeated runs in one process never share a seed. Reruns of a full
//! suite are only reproducible if the counter starts from the same value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Seed used by the first run in a fresh process
pub const DEFAULT_SEED: u64 = 42;

static GLOBAL: OnceLock<Arc<SeedCounter>> = OnceLock::new();

#[derive(Debug)]
pub struct SeedCounter {
    next: AtomicU64,
}

impl SeedCounter {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// The process-wide counter shared by orchestrators built with
    /// [`crate::orchestrator::TestOrchestrator::new`].
    pub fn global() -> Arc<SeedCounter> {
        GLOBAL
            .get_or_init(|| Arc::new(SeedCounter::new(DEFAULT_SEED)))
            .clone()
    }

    /// Seed the next run will use
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }

    /// Take the current seed and advance the counter by exactly one.
    pub fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Restart the sequence, e.g. to reproduce a full-suite run.
    pub fn reset(&self, start: u64) {
        self.next.store(start, Ordering::SeqCst);
    }
}

impl Default for SeedCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
