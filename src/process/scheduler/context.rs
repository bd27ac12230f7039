/*!
 * Process Context
 * The running process's handle on the kernel and on its own memory
 */

use super::operations::Spawn;
use super::Kernel;
use crate::core::errors::ProcessResult;
use crate::core::types::{Pid, Tick};
use crate::process::core::traits::Process;
use crate::process::core::types::{Priority, ProcessInfo, SleepDuration};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handed to `Process::run` for the duration of one call
///
/// Owns the process's memory while it runs; the kernel writes it back to the
/// table afterwards unless the process was killed in the meantime.
pub struct ProcessContext<'a> {
    kernel: &'a mut Kernel,
    pid: Pid,
    parent_pid: Pid,
    priority: Priority,
    memory: Value,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(
        kernel: &'a mut Kernel,
        pid: Pid,
        parent_pid: Pid,
        priority: Priority,
        memory: Value,
    ) -> Self {
        Self {
            kernel,
            pid,
            parent_pid,
            priority,
            memory,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn parent_pid(&self) -> Pid {
        self.parent_pid
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Tick being executed
    #[inline]
    pub fn tick(&self) -> Tick {
        self.kernel.current_tick()
    }

    pub fn memory(&self) -> &Value {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Value {
        &mut self.memory
    }

    /// Replace the whole memory blob
    pub fn set_memory(&mut self, memory: Value) {
        self.memory = memory;
    }

    /// Decode memory into a typed view
    ///
    /// A fresh process has `{}` as memory, which decodes to `T::default()`.
    pub fn load_memory<T>(&self) -> ProcessResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match &self.memory {
            Value::Null => Ok(T::default()),
            Value::Object(map) if map.is_empty() => Ok(T::default()),
            other => Ok(T::deserialize(other)?),
        }
    }

    /// Encode a typed view back into memory
    pub fn save_memory<T: Serialize>(&mut self, value: &T) -> ProcessResult<()> {
        self.memory = serde_json::to_value(value)?;
        Ok(())
    }

    /// Describe a child of the running process
    pub fn child(&self, workload: impl Process + 'static) -> Spawn {
        Spawn::new(self.pid, Box::new(workload))
    }

    /// Add a process; it first runs after the next load
    pub fn spawn(&mut self, spawn: Spawn, priority: Priority) -> Pid {
        self.kernel.add_process(spawn, priority)
    }

    /// Kill another process and its descendants
    pub fn kill(&mut self, pid: Pid) {
        self.kernel.kill_process(pid);
    }

    /// Kill the running process and its descendants
    pub fn stop(&mut self) {
        self.kernel.kill_process(self.pid);
    }

    /// Put the running process to sleep
    pub fn sleep(&mut self, duration: impl Into<SleepDuration>) -> ProcessResult<()> {
        self.kernel.sleep_process(self.pid, duration).map(|_| ())
    }

    pub fn sleep_process(
        &mut self,
        pid: Pid,
        duration: impl Into<SleepDuration>,
    ) -> ProcessResult<ProcessInfo> {
        self.kernel.sleep_process(pid, duration)
    }

    /// Look up any process in the table
    pub fn process(&self, pid: Pid) -> Option<ProcessInfo> {
        self.kernel.get_process(pid)
    }

    /// Live children of the running process
    pub fn children(&self) -> Vec<Pid> {
        self.kernel.children(self.pid)
    }

    pub(crate) fn into_memory(self) -> Value {
        self.memory
    }
}

impl std::fmt::Debug for ProcessContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessContext")
            .field("pid", &self.pid)
            .field("parent_pid", &self.parent_pid)
            .field("priority", &self.priority)
            .field("tick", &self.tick())
            .finish()
    }
}
