/*!
 * Kernel Core Operations
 * Add, kill, sleep and lookup operations exposed to hosts and workloads
 */

use super::entry::ProcessEntry;
use super::Kernel;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::types::{is_root, Pid};
use crate::persistence::empty_memory;
use crate::process::core::traits::Process;
use crate::process::core::types::{Priority, ProcessInfo, ProcessStatus, SleepDuration, SleepInfo};
use crate::process::lifecycle::{bury, live_children};
use serde_json::Value;
use tracing::{debug, warn};

/// A process waiting to be added to the table
pub struct Spawn {
    parent_pid: Pid,
    pid: Option<Pid>,
    memory: Option<Value>,
    workload: Box<dyn Process>,
}

impl Spawn {
    pub fn new(parent_pid: Pid, workload: Box<dyn Process>) -> Self {
        Self {
            parent_pid,
            pid: None,
            memory: None,
            workload,
        }
    }

    /// Use a specific PID instead of allocating one
    #[must_use]
    pub fn with_pid(mut self, pid: Pid) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Start with this memory instead of `{}`
    #[must_use]
    pub fn with_memory(mut self, memory: Value) -> Self {
        self.memory = Some(memory);
        self
    }
}

impl Kernel {
    /// Add a process to the live table
    ///
    /// Allocates a PID when none was given. The process is not queued: it
    /// first runs after the next load rebuilds the queues.
    pub fn add_process(&mut self, spawn: Spawn, priority: Priority) -> Pid {
        let Spawn {
            parent_pid,
            pid,
            memory,
            workload,
        } = spawn;

        let pid = match pid {
            Some(pid) => pid,
            None => self.next_pid(),
        };

        let memory = memory.unwrap_or_else(empty_memory);
        let entry = ProcessEntry::new(pid, parent_pid, priority, memory, workload);

        debug!(
            pid,
            parent_pid,
            type_name = %entry.type_name,
            priority = %priority,
            "Adding process"
        );

        if self.table.insert(pid, entry).is_some() {
            // The replacement was not loaded this tick and must not run in it
            for queue in &mut self.queues {
                queue.retain(|queued| *queued != pid);
            }
            warn!(pid, "Replaced existing process table entry");
        }

        pid
    }

    /// Next PID not present in the table
    ///
    /// Scans upward from the persisted counter, wrapping to 0 at the
    /// configured ceiling. Dead entries still hold their PID until the next
    /// load, so a PID is never reused within the tick it died in.
    ///
    /// # Performance
    /// Amortized O(1): the counter only moves past PIDs already taken
    pub fn next_pid(&mut self) -> Pid {
        let ceiling = self.config.pid_ceiling;
        let span = u64::from(ceiling) + 1;
        let mut scanned: u64 = 0;

        while self.table.contains_key(&self.pid_counter) {
            scanned += 1;
            if scanned > span {
                // Every PID up to the ceiling is taken
                self.pid_counter = self.first_free_above(ceiling);
                warn!(
                    ceiling,
                    pid = self.pid_counter,
                    "PID space exhausted, allocating above ceiling"
                );
                break;
            }

            if self.pid_counter >= ceiling {
                self.pid_counter = 0;
            } else {
                self.pid_counter += 1;
            }
        }

        self.pid_counter
    }

    fn first_free_above(&self, ceiling: Pid) -> Pid {
        (ceiling.saturating_add(1)..=Pid::MAX)
            .find(|pid| !self.table.contains_key(pid))
            .unwrap_or(ceiling)
    }

    /// Kill a process and every live descendant
    ///
    /// The root is never killed. Unknown and already-dead PIDs are no-ops.
    /// Children are collected before anything is marked, and each PID is
    /// visited at most once even if corrupt parent links form a cycle.
    pub fn kill_process(&mut self, pid: Pid) {
        if is_root(pid) {
            debug!("Ignoring kill of root process");
            return;
        }

        let mut pending = vec![pid];
        while let Some(pid) = pending.pop() {
            if is_root(pid) {
                continue;
            }

            match self.table.get(&pid) {
                Some(entry) if entry.status.is_live() => {}
                Some(_) => continue,
                None => {
                    debug!(pid, "Kill of unknown process ignored");
                    continue;
                }
            }

            let children = live_children(&self.table, pid);
            if let Some(entry) = self.table.get_mut(&pid) {
                bury(entry);
            }
            pending.extend(children);
        }
    }

    /// Put a process to sleep starting at the current tick
    ///
    /// `SleepDuration::Forever` (wire value `-1`) never wakes on its own.
    pub fn sleep_process(
        &mut self,
        pid: Pid,
        duration: impl Into<SleepDuration>,
    ) -> ProcessResult<ProcessInfo> {
        let duration = duration.into();
        let tick = self.tick;
        let entry = self
            .table
            .get_mut(&pid)
            .ok_or(ProcessError::NotFound(pid))?;

        if entry.status.is_dead() {
            return Err(ProcessError::InvalidState(format!(
                "process {} is dead and cannot sleep",
                pid
            )));
        }

        entry.status = ProcessStatus::Asleep(SleepInfo::new(tick, duration));
        debug!(
            pid,
            type_name = %entry.type_name,
            ticks = duration.to_wire(),
            "Sleeping process"
        );

        Ok(entry.info())
    }

    /// Look up a process in the table (dead entries included until store)
    pub fn get_process(&self, pid: Pid) -> Option<ProcessInfo> {
        self.table.get(&pid).map(ProcessEntry::info)
    }

    /// Check whether `pid` is an alive or asleep process
    pub fn is_live(&self, pid: Pid) -> bool {
        self.table
            .get(&pid)
            .map_or(false, |entry| entry.status.is_live())
    }

    /// Snapshot of the whole table in PID order
    pub fn processes(&self) -> Vec<ProcessInfo> {
        self.table.values().map(ProcessEntry::info).collect()
    }

    /// Live children of `pid` in PID order
    pub fn children(&self, pid: Pid) -> Vec<Pid> {
        live_children(&self.table, pid)
    }

    /// Current memory of a process
    pub fn process_memory(&self, pid: Pid) -> Option<&Value> {
        self.table
            .get(&pid)
            .filter(|entry| entry.status.is_live())
            .map(|entry| &entry.memory)
    }

    /// Number of entries in the table, dead ones included
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of alive or asleep processes
    pub fn live_count(&self) -> usize {
        self.table
            .values()
            .filter(|entry| entry.status.is_live())
            .count()
    }
}
