/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// Host tick number (one kernel invocation per tick)
pub type Tick = u64;

/// Implicit root of the process tree; never killed
pub const ROOT_PID: Pid = 0;

/// Check whether a PID names the implicit root
#[inline(always)]
#[must_use]
pub const fn is_root(pid: Pid) -> bool {
    pid == ROOT_PID
}
