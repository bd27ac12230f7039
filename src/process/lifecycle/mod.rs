/*!
 * Process Lifecycle Management
 * Host collaborators (clock, budget) and process cleanup
 */

pub mod budget;
mod cleanup;
pub mod clock;

// Re-export public types
pub use budget::{BudgetMeter, FixedBudget, WallClockBudget};
pub use clock::{Clock, ManualClock};

// Internal cleanup utilities
pub(crate) use cleanup::{bury, collect_memory, live_children};
