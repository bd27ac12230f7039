/*!
 * Process Module
 * Process contract, type registry, host collaborators and the tick scheduler
 */

pub mod core;
pub mod lifecycle;
pub mod registry;
pub mod scheduler;

// Re-export for convenience
pub use self::core::{
    Priority, Process, ProcessInfo, ProcessStatus, SleepDuration, SleepInfo,
};
pub use lifecycle::{BudgetMeter, Clock, FixedBudget, ManualClock, WallClockBudget};
pub use registry::{ProcessFactory, ProcessTypeRegistry};
pub use scheduler::{
    Kernel, KernelBuilder, KernelConfig, LoadReport, ProcessContext, Spawn, TickReport,
};
