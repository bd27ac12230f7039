/*!
 * Tick Statistics
 * Per-phase reports returned by load and run
 */

use crate::core::types::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of rebuilding the table from the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub tick: Tick,
    /// Records rebuilt into live processes
    pub loaded: usize,
    /// Records whose type name is not registered
    pub unknown_types: usize,
    /// Records repeating a PID already loaded this tick
    pub duplicates: usize,
    /// Memory slots dropped because no process owns them
    pub collected_memory: usize,
    /// Store keys that were missing or malformed
    pub repaired: Vec<String>,
}

/// Outcome of one run phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Processes whose `run` was invoked
    pub executed: usize,
    /// Sleepers whose sleep elapsed this tick
    pub woken: usize,
    /// Processes killed because their parent was gone
    pub orphaned: usize,
    /// Processes killed because their `run` failed
    pub faulted: usize,
    /// Processes left in the queues when the budget ran out
    pub deferred: usize,
    pub budget_exhausted: bool,
}

impl TickReport {
    pub(crate) fn new(tick: Tick) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {}: executed={} woken={} orphaned={} faulted={} deferred={}",
            self.tick, self.executed, self.woken, self.orphaned, self.faulted, self.deferred
        )?;
        if self.budget_exhausted {
            f.write_str(" (budget exhausted)")?;
        }
        Ok(())
    }
}
