/*!
 * Tick Kernel Library
 * Tick-driven process scheduler over a persistent key-value store
 */

pub mod core;
pub mod monitoring;
pub mod persistence;
pub mod process;

// Re-exports
pub use crate::core::errors::{KernelError, ProcessError, ProcessResult, StoreError};
pub use crate::core::types::{Pid, Tick, ROOT_PID};
pub use persistence::{FileStore, MemoryStore, Store};
pub use process::{
    BudgetMeter, Clock, FixedBudget, Kernel, KernelBuilder, KernelConfig, LoadReport,
    ManualClock, Priority, Process, ProcessContext, ProcessInfo, ProcessStatus,
    ProcessTypeRegistry, SleepDuration, SleepInfo, Spawn, TickReport, WallClockBudget,
};
