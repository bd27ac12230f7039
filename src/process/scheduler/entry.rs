/*!
 * Process Table Entry
 * Per-process control block held by the kernel for one tick
 */

use crate::core::types::Pid;
use crate::persistence::ProcessRecord;
use crate::process::core::traits::Process;
use crate::process::core::types::{Priority, ProcessInfo, ProcessStatus};
use serde_json::Value;

/// Control block for one process
///
/// The workload object is taken out while its `run` is on the stack, so the
/// kernel can hand the process a mutable context without aliasing it.
pub struct ProcessEntry {
    pub pid: Pid,
    pub parent_pid: Pid,
    pub type_name: String,
    pub priority: Priority,
    pub status: ProcessStatus,
    pub memory: Value,
    pub(crate) workload: Option<Box<dyn Process>>,
}

impl ProcessEntry {
    pub(crate) fn new(
        pid: Pid,
        parent_pid: Pid,
        priority: Priority,
        memory: Value,
        workload: Box<dyn Process>,
    ) -> Self {
        Self {
            pid,
            parent_pid,
            type_name: workload.type_name().to_string(),
            priority,
            status: ProcessStatus::Alive,
            memory,
            workload: Some(workload),
        }
    }

    /// Rebuild from a persisted record, restoring any sleep
    ///
    /// Keeps the record's type name, which is the name the factory was
    /// registered under.
    pub(crate) fn from_record(
        record: ProcessRecord,
        memory: Value,
        workload: Box<dyn Process>,
    ) -> Self {
        let status = match record.sleep {
            Some(info) => ProcessStatus::Asleep(info),
            None => ProcessStatus::Alive,
        };

        Self {
            pid: record.pid,
            parent_pid: record.parent_pid,
            type_name: record.type_name,
            priority: record.priority,
            status,
            memory,
            workload: Some(workload),
        }
    }

    /// Snapshot for callers outside the kernel
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            parent_pid: self.parent_pid,
            type_name: self.type_name.clone(),
            priority: self.priority,
            status: self.status,
        }
    }

    /// Persisted form
    pub fn record(&self) -> ProcessRecord {
        ProcessRecord {
            pid: self.pid,
            parent_pid: self.parent_pid,
            type_name: self.type_name.clone(),
            priority: self.priority,
            sleep: self.status.sleep_info().copied(),
        }
    }
}

impl std::fmt::Debug for ProcessEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessEntry")
            .field("pid", &self.pid)
            .field("parent_pid", &self.parent_pid)
            .field("type_name", &self.type_name)
            .field("priority", &self.priority)
            .field("status", &self.status)
            .field("running", &self.workload.is_none())
            .finish()
    }
}
