/*!
 * Tick Scheduler
 * Rebuilds the process tree from persisted records, runs it by priority
 * under the host's CPU budget, and writes the survivors back
 *
 * One tick is `load` → `run` → `store`. Nothing but the persisted store
 * survives between ticks: the table and queues are rebuilt at every load.
 */

use crate::core::types::{Pid, Tick};
use crate::process::core::types::Priority;
use crate::process::lifecycle::{BudgetMeter, Clock, FixedBudget, ManualClock};
use crate::process::registry::ProcessTypeRegistry;
use std::collections::{BTreeMap, VecDeque};

mod builder;
mod config;
mod context;
mod entry;
mod operations;
mod stats;
mod tick;

pub use builder::KernelBuilder;
pub use config::KernelConfig;
pub use context::ProcessContext;
pub(crate) use entry::ProcessEntry;
pub use operations::Spawn;
pub use stats::{LoadReport, TickReport};

/// The scheduler
///
/// Owns the live process table and the per-class run queues for the
/// current tick. Single-threaded: every operation takes `&mut self`.
pub struct Kernel {
    registry: ProcessTypeRegistry,
    clock: Box<dyn Clock>,
    budget: Box<dyn BudgetMeter>,
    config: KernelConfig,

    // Ordered by PID; this is the table-iteration order used by store
    table: BTreeMap<Pid, ProcessEntry>,

    // One FIFO per priority class, filled only by load
    queues: [VecDeque<Pid>; Priority::COUNT],

    pid_counter: Pid,
    tick: Tick,
}

impl Kernel {
    /// Kernel with a manual clock at tick 0 and an unlimited budget
    pub fn new(registry: ProcessTypeRegistry) -> Self {
        Self::builder().with_registry(registry).build()
    }

    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: ProcessTypeRegistry,
        clock: Box<dyn Clock>,
        budget: Box<dyn BudgetMeter>,
        config: KernelConfig,
    ) -> Self {
        let tick = clock.current_tick();
        Self {
            registry,
            clock,
            budget,
            config,
            table: BTreeMap::new(),
            queues: Default::default(),
            pid_counter: 0,
            tick,
        }
    }

    pub fn registry(&self) -> &ProcessTypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Tick captured at the last load
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Current PID allocator hint
    pub fn pid_counter(&self) -> Pid {
        self.pid_counter
    }

    /// Processes still waiting in the run queues
    pub fn queued(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Drop everything held for the current tick
    fn reboot(&mut self) {
        self.table.clear();
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::from_parts(
            ProcessTypeRegistry::new(),
            Box::new(ManualClock::default()),
            Box::new(FixedBudget::unlimited()),
            KernelConfig::default(),
        )
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("tick", &self.tick)
            .field("pid_counter", &self.pid_counter)
            .field("processes", &self.table.len())
            .field("queued", &self.queued())
            .field("config", &self.config)
            .finish()
    }
}
