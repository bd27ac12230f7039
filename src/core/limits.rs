/*!
 * System Limits and Constants
 *
 * Centralized location for persisted keys, PID bounds and host defaults.
 */

use super::types::Pid;

// =============================================================================
// PERSISTED KEYS
// =============================================================================

/// Last assigned-or-scanned PID hint
pub const PID_COUNTER_KEY: &str = "pidCounter";

/// Ordered list of process records
pub const PROCESS_TABLE_KEY: &str = "processTable";

/// Map from PID (string key) to opaque process memory
pub const PROCESS_MEMORY_KEY: &str = "processMemory";

// =============================================================================
// PROCESS LIMITS
// =============================================================================

/// Highest PID handed out before the allocator wraps to 0
pub const DEFAULT_PID_CEILING: Pid = Pid::MAX;

/// Sleep duration sentinel for "never auto-wake" on the wire
pub const SLEEP_FOREVER: i64 = -1;

// =============================================================================
// HOST DEFAULTS
// =============================================================================

/// Default per-tick CPU allowance for the wall-clock budget (milliseconds)
pub const DEFAULT_CPU_LIMIT_MS: f64 = 20.0;

/// Default delay between ticks when the CLI drives the kernel (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Default location of the persisted state document
pub const DEFAULT_STATE_PATH: &str = "/tmp/tick-kernel/state.json";
