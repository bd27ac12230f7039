/*!
 * Process Cleanup Logic
 * Tearing down dead processes and collecting orphaned memory slots
 */

use crate::core::types::Pid;
use crate::process::core::types::ProcessStatus;
use crate::process::scheduler::ProcessEntry;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Drop memory slots whose PID is not in the process table
///
/// Returns the number of slots collected.
pub(crate) fn collect_memory(
    memory: &mut BTreeMap<Pid, Value>,
    table: &BTreeMap<Pid, ProcessEntry>,
) -> usize {
    let before = memory.len();
    memory.retain(|pid, _| table.contains_key(pid));
    let collected = before - memory.len();

    if collected > 0 {
        debug!(collected, "Collected orphaned process memory");
    }
    collected
}

/// PIDs of live processes whose parent is `parent`
///
/// The root is its own parent; it is never reported as a child.
pub(crate) fn live_children(table: &BTreeMap<Pid, ProcessEntry>, parent: Pid) -> Vec<Pid> {
    table
        .values()
        .filter(|entry| entry.pid != parent && entry.parent_pid == parent)
        .filter(|entry| entry.status.is_live())
        .map(|entry| entry.pid)
        .collect()
}

/// Mark an entry dead and release its memory slot
pub(crate) fn bury(entry: &mut ProcessEntry) {
    entry.status = ProcessStatus::Dead;
    entry.memory = Value::Null;
    debug!(pid = entry.pid, type_name = %entry.type_name, "Killed process");
}
