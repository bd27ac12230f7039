/*!
 * Tick Cycle
 * Load, run and store phases of one scheduler tick
 */

use super::context::ProcessContext;
use super::entry::ProcessEntry;
use super::stats::{LoadReport, TickReport};
use super::Kernel;
use crate::core::errors::{KernelError, Result};
use crate::core::limits::PROCESS_MEMORY_KEY;
use crate::core::types::{is_root, Pid};
use crate::monitoring::span_tick;
use crate::persistence::{empty_memory, state::encode_memory, PersistedState, Store};
use crate::process::core::types::{Priority, ProcessStatus};
use crate::process::lifecycle::collect_memory;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

impl Kernel {
    /// Run one full tick against `store`
    ///
    /// The store phase runs even when the run phase fails, so kills and
    /// memory writes made before the failure are kept.
    pub fn tick(&mut self, store: &mut dyn Store) -> Result<TickReport> {
        let span = span_tick(self.clock.current_tick());
        let _entered = span.enter();

        self.load(store);
        let result = self.run();
        self.store(store);

        match &result {
            Ok(report) => span.record_report(report),
            Err(e) => span.record_error(&e.to_string()),
        }
        result
    }

    /// Rebuild the table and queues from the store
    ///
    /// Never fails: malformed persisted state is reset to defaults and the
    /// repaired keys are written back. Records with an unregistered type
    /// are dropped, and memory owned by no loaded process is collected.
    pub fn load(&mut self, store: &mut dyn Store) -> LoadReport {
        self.tick = self.clock.current_tick();
        debug!(tick = self.tick, "Tick {}", self.tick);

        let state = PersistedState::decode(store);
        state.write_repairs(store);

        self.reboot();
        self.pid_counter = state.pid_counter;

        let mut report = LoadReport {
            tick: self.tick,
            repaired: state.repaired.iter().map(|key| key.to_string()).collect(),
            ..LoadReport::default()
        };

        let PersistedState {
            records,
            mut memory,
            ..
        } = state;

        for record in records {
            if self.table.contains_key(&record.pid) {
                warn!(pid = record.pid, "Skipping duplicate process record");
                report.duplicates += 1;
                continue;
            }

            let Some(factory) = self.registry.fetch(&record.type_name) else {
                debug!(
                    pid = record.pid,
                    type_name = %record.type_name,
                    "Dropping process of unknown type"
                );
                report.unknown_types += 1;
                continue;
            };

            let workload = factory(record.parent_pid, record.pid);
            let slot = memory.entry(record.pid).or_insert_with(empty_memory);
            if slot.is_null() {
                *slot = empty_memory();
            }

            let pid = record.pid;
            let priority = record.priority;
            let entry = ProcessEntry::from_record(record, slot.clone(), workload);
            self.table.insert(pid, entry);
            self.queues[priority.index()].push_back(pid);
            report.loaded += 1;
        }

        report.collected_memory = collect_memory(&mut memory, &self.table);
        store.set(PROCESS_MEMORY_KEY, encode_memory(&memory));

        debug!(
            loaded = report.loaded,
            unknown_types = report.unknown_types,
            collected_memory = report.collected_memory,
            "Process table rebuilt"
        );
        report
    }

    /// Drain the queues in priority order under the CPU budget
    ///
    /// The budget is checked before every dequeue; once it is spent the rest
    /// of the queues are dropped for this tick. Their records are still in
    /// the store, so they run again after the next load.
    pub fn run(&mut self) -> Result<TickReport> {
        let mut report = TickReport::new(self.tick);

        for priority in Priority::ALL {
            while !self.queues[priority.index()].is_empty() {
                if self.budget_spent() {
                    report.budget_exhausted = true;
                    report.deferred = self.queued_live();
                    self.clear_queues();
                    info!(
                        tick = self.tick,
                        deferred = report.deferred,
                        used = self.budget.used(),
                        limit = self.budget.limit(),
                        "CPU budget exhausted, deferring remaining processes"
                    );
                    return Ok(report);
                }

                let Some(pid) = self.queues[priority.index()].pop_front() else {
                    break;
                };
                self.dispatch(pid, &mut report)?;
            }
        }

        Ok(report)
    }

    /// Write every surviving process back to the store
    ///
    /// Dead entries are dropped here; their PIDs become free at the next
    /// load.
    pub fn store(&self, store: &mut dyn Store) {
        let survivors = self.table.values().filter(|entry| entry.status.is_live());

        let mut records = Vec::new();
        let mut memory = BTreeMap::new();
        for entry in survivors {
            records.push(entry.record());
            memory.insert(entry.pid, entry.memory.clone());
        }

        debug!(
            survivors = records.len(),
            pid_counter = self.pid_counter,
            "Storing process table"
        );

        PersistedState {
            pid_counter: self.pid_counter,
            records,
            memory,
            repaired: Vec::new(),
        }
        .encode(store);
    }

    fn budget_spent(&self) -> bool {
        !self.config.budget_exempt && self.budget.is_exhausted()
    }

    /// Queued PIDs that were not killed earlier in the tick
    fn queued_live(&self) -> usize {
        self.queues
            .iter()
            .flatten()
            .filter(|pid| self.is_live(**pid))
            .count()
    }

    fn clear_queues(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }

    /// Orphan check, wake check, then execute
    fn dispatch(&mut self, pid: Pid, report: &mut TickReport) -> Result<()> {
        let Some(entry) = self.table.get(&pid) else {
            return Ok(());
        };

        // Killed earlier in this tick
        if entry.status.is_dead() {
            return Ok(());
        }

        if !is_root(pid) && !self.is_live(entry.parent_pid) {
            warn!(
                pid,
                parent_pid = entry.parent_pid,
                type_name = %entry.type_name,
                "Killing orphaned process"
            );
            self.kill_process(pid);
            report.orphaned += 1;
            return Ok(());
        }

        if let ProcessStatus::Asleep(info) = entry.status {
            if !info.has_elapsed(self.tick) {
                return Ok(());
            }
            if let Some(entry) = self.table.get_mut(&pid) {
                entry.status = ProcessStatus::Alive;
            }
            debug!(pid, slept_since = info.start, "Woke process");
            report.woken += 1;
        }

        self.execute(pid, report)
    }

    fn execute(&mut self, pid: Pid, report: &mut TickReport) -> Result<()> {
        let Some(entry) = self.table.get_mut(&pid) else {
            return Ok(());
        };
        let Some(mut workload) = entry.workload.take() else {
            return Ok(());
        };

        let memory = std::mem::take(&mut entry.memory);
        let parent_pid = entry.parent_pid;
        let priority = entry.priority;
        debug!(pid, type_name = %entry.type_name, "Running process");

        let mut ctx = ProcessContext::new(self, pid, parent_pid, priority, memory);
        let result = workload.run(&mut ctx);
        let memory = ctx.into_memory();
        report.executed += 1;

        // The entry may have been killed, or replaced by an explicit-PID add
        if let Some(entry) = self.table.get_mut(&pid) {
            if entry.status.is_live() && entry.workload.is_none() {
                entry.workload = Some(workload);
                entry.memory = memory;
            }
        }

        if let Err(e) = result {
            if !self.config.isolate_faults {
                error!(pid, error = %e, "Process failed, aborting tick");
                self.clear_queues();
                return Err(KernelError::Process(e));
            }

            error!(pid, error = %e, "Process failed, killing it");
            self.kill_process(pid);
            report.faulted += 1;
        }

        Ok(())
    }
}
