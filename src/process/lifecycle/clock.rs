/*!
 * Tick Clock
 * Host-supplied tick number
 */

use crate::core::types::Tick;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current tick; advances by one per invocation
pub trait Clock: Send + Sync {
    fn current_tick(&self) -> Tick;
}

/// Clock driven by hand
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    tick: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Tick) -> Self {
        Self {
            tick: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, tick: Tick) {
        self.tick.store(tick, Ordering::Relaxed);
    }

    /// Move to the next tick and return it
    pub fn advance(&self) -> Tick {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Clock for ManualClock {
    fn current_tick(&self) -> Tick {
        self.tick.load(Ordering::Relaxed)
    }
}
