/*!
 * Shared test workloads
 * Small processes that record what the kernel did to them
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tick_kernel::{
    FixedBudget, Kernel, ManualClock, MemoryStore, Pid, Priority, Process, ProcessContext,
    ProcessError, ProcessResult, ProcessTypeRegistry, SleepDuration, Tick,
};

/// Order in which processes ran, as `(tick, pid)`
pub type RunLog = Arc<Mutex<Vec<(Tick, Pid)>>>;

/// Records each run
pub struct Recorder {
    pub log: RunLog,
}

impl Process for Recorder {
    fn type_name(&self) -> &'static str {
        "Recorder"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        self.log.lock().push((ctx.tick(), ctx.pid()));
        Ok(())
    }
}

/// Records its run, then sleeps once for the duration stored in memory
pub struct Napper {
    pub log: RunLog,
}

impl Process for Napper {
    fn type_name(&self) -> &'static str {
        "Napper"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        self.log.lock().push((ctx.tick(), ctx.pid()));
        let ticks = ctx.memory()["nap"].as_i64().unwrap_or(0);
        ctx.sleep(SleepDuration::from_wire(ticks))
    }
}

/// Records its run, then spends the whole tick budget
pub struct Burner {
    pub log: RunLog,
    pub budget: FixedBudget,
}

impl Process for Burner {
    fn type_name(&self) -> &'static str {
        "Burner"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        self.log.lock().push((ctx.tick(), ctx.pid()));
        self.budget.exhaust();
        Ok(())
    }
}

/// Spawns one `Recorder` child on its first run
pub struct Spawner;

impl Process for Spawner {
    fn type_name(&self) -> &'static str {
        "Spawner"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        if ctx.memory().get("child").is_some() {
            return Ok(());
        }

        let log = RunLog::default();
        let spawn = ctx.child(Recorder { log });
        let child = ctx.spawn(spawn, Priority::Always);
        ctx.memory_mut()["child"] = json!(child);
        Ok(())
    }
}

/// Kills itself, taking its descendants with it
pub struct Quitter;

impl Process for Quitter {
    fn type_name(&self) -> &'static str {
        "Quitter"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        ctx.stop();
        Ok(())
    }
}

/// Overwrites its memory with the tick it last ran at
pub struct Stamper;

impl Process for Stamper {
    fn type_name(&self) -> &'static str {
        "Stamper"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        let tick = ctx.tick();
        ctx.set_memory(json!({ "stamped": tick }));
        Ok(())
    }
}

/// Once, re-adds PID 1 as a low-priority `Recorder`
pub struct Replacer {
    pub log: RunLog,
}

impl Process for Replacer {
    fn type_name(&self) -> &'static str {
        "Replacer"
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        if ctx.memory().get("replaced").is_some() {
            return Ok(());
        }

        let spawn = ctx.child(Recorder { log: self.log.clone() }).with_pid(1);
        ctx.spawn(spawn, Priority::Low);
        ctx.memory_mut()["replaced"] = json!(true);
        Ok(())
    }
}

/// Always fails
pub struct Faulty;

impl Process for Faulty {
    fn type_name(&self) -> &'static str {
        "Faulty"
    }

    fn run(&mut self, _ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        Err(ProcessError::Failed("sensor offline".into()))
    }
}

/// Registry with every test workload sharing one run log
pub fn registry(log: &RunLog, budget: &FixedBudget) -> ProcessTypeRegistry {
    let registry = ProcessTypeRegistry::new();

    let recorder_log = log.clone();
    registry.register("Recorder", move |_, _| {
        Box::new(Recorder {
            log: recorder_log.clone(),
        }) as Box<dyn Process>
    });

    let napper_log = log.clone();
    registry.register("Napper", move |_, _| {
        Box::new(Napper {
            log: napper_log.clone(),
        }) as Box<dyn Process>
    });

    let burner_log = log.clone();
    let burner_budget = budget.clone();
    registry.register("Burner", move |_, _| {
        Box::new(Burner {
            log: burner_log.clone(),
            budget: burner_budget.clone(),
        }) as Box<dyn Process>
    });

    let replacer_log = log.clone();
    registry.register("Replacer", move |_, _| {
        Box::new(Replacer {
            log: replacer_log.clone(),
        }) as Box<dyn Process>
    });

    registry.register("Spawner", |_, _| Box::new(Spawner) as Box<dyn Process>);
    registry.register("Quitter", |_, _| Box::new(Quitter) as Box<dyn Process>);
    registry.register("Stamper", |_, _| Box::new(Stamper) as Box<dyn Process>);
    registry.register("Faulty", |_, _| Box::new(Faulty) as Box<dyn Process>);
    registry
}

/// Kernel plus handles on everything the host controls
pub struct Harness {
    pub kernel: Kernel,
    pub store: MemoryStore,
    pub clock: ManualClock,
    pub budget: FixedBudget,
    pub log: RunLog,
}

impl Harness {
    pub fn new(document: Value) -> Self {
        let log = RunLog::default();
        let budget = FixedBudget::new(100.0);
        let clock = ManualClock::new(1);

        let kernel = Kernel::builder()
            .with_registry(registry(&log, &budget))
            .with_clock(clock.clone())
            .with_budget(budget.clone())
            .build();

        Self {
            kernel,
            store: MemoryStore::from_document(document),
            clock,
            budget,
            log,
        }
    }

    /// Store seeded with a record list and empty memory
    pub fn with_records(records: Value) -> Self {
        Self::new(json!({
            "pidCounter": 0,
            "processTable": records,
            "processMemory": {}
        }))
    }

    /// PIDs that ran, in order
    pub fn ran(&self) -> Vec<Pid> {
        self.log.lock().iter().map(|(_, pid)| *pid).collect()
    }

    /// PIDs that ran at `tick`
    pub fn ran_at(&self, tick: Tick) -> Vec<Pid> {
        self.log
            .lock()
            .iter()
            .filter(|(t, _)| *t == tick)
            .map(|(_, pid)| *pid)
            .collect()
    }

    pub fn persisted_pids(&self) -> Vec<Pid> {
        self.store.document()["processTable"]
            .as_array()
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| r[0].as_u64())
                    .map(|pid| pid as Pid)
                    .collect()
            })
            .unwrap_or_default()
    }
}
