/*!
 * Demo Workloads
 * Root process and a heartbeat child for driving a real state file
 */

use serde::{Deserialize, Serialize};
use tick_kernel::{
    Pid, Priority, Process, ProcessContext, ProcessResult, ProcessTypeRegistry, SleepDuration,
    Tick,
};
use tracing::info;

/// Ticks a heartbeat sleeps between beats
const HEARTBEAT_INTERVAL: u64 = 2;

pub const INIT: &str = "Init";
pub const HEARTBEAT: &str = "Heartbeat";

/// Register every demo workload type
pub fn register(registry: &ProcessTypeRegistry) {
    registry.register(INIT, |_, _| Box::new(Init) as Box<dyn Process>);
    registry.register(HEARTBEAT, |_, _| Box::new(Heartbeat) as Box<dyn Process>);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InitMemory {
    heartbeat: Option<Pid>,
}

/// Root process: keeps one heartbeat child alive
pub struct Init;

impl Process for Init {
    fn type_name(&self) -> &'static str {
        INIT
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        let mut memory: InitMemory = ctx.load_memory()?;

        let alive = memory
            .heartbeat
            .and_then(|pid| ctx.process(pid))
            .map_or(false, |info| info.is_live());

        if !alive {
            let spawn = ctx.child(Heartbeat);
            let pid = ctx.spawn(spawn, Priority::Normal);
            info!(pid, "Started heartbeat");
            memory.heartbeat = Some(pid);
            ctx.save_memory(&memory)?;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HeartbeatMemory {
    beats: u64,
    last_tick: Option<Tick>,
}

/// Counts its own runs and sleeps between them
pub struct Heartbeat;

impl Process for Heartbeat {
    fn type_name(&self) -> &'static str {
        HEARTBEAT
    }

    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        let mut memory: HeartbeatMemory = ctx.load_memory()?;
        memory.beats += 1;
        memory.last_tick = Some(ctx.tick());
        info!(pid = ctx.pid(), beats = memory.beats, "Heartbeat");

        ctx.save_memory(&memory)?;
        ctx.sleep(SleepDuration::Ticks(HEARTBEAT_INTERVAL))
    }
}
