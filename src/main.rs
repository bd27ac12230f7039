/*!
 * Tick Kernel - Main Entry Point
 *
 * Drives the scheduler against a JSON state file:
 * - `run` executes ticks on an interval until Ctrl+C or `--ticks`
 * - `show` prints the persisted document
 * - `reset` erases all persisted state
 */

mod workloads;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Duration;
use tick_kernel::core::limits::{
    DEFAULT_CPU_LIMIT_MS, DEFAULT_STATE_PATH, DEFAULT_TICK_INTERVAL_MS,
};
use tick_kernel::monitoring::init_tracing;
use tick_kernel::{
    FileStore, Kernel, KernelConfig, ManualClock, Priority, ProcessTypeRegistry, Spawn, Store,
    WallClockBudget, ROOT_PID,
};
use tracing::{error, info};

/// Host-owned key holding the last tick number; the kernel ignores it
const HOST_TICK_KEY: &str = "hostTick";

#[derive(Parser, Debug)]
#[command(name = "kernel")]
#[command(version, about = "Tick-driven process scheduler", long_about = None)]
struct Args {
    /// Path to the persisted state document
    #[arg(long, env = "KERNEL_STATE_PATH", default_value = DEFAULT_STATE_PATH)]
    state: PathBuf,

    /// Per-tick CPU allowance in milliseconds
    #[arg(long, env = "KERNEL_CPU_LIMIT_MS", default_value_t = DEFAULT_CPU_LIMIT_MS)]
    cpu_limit: f64,

    /// Ignore the CPU budget (simulation)
    #[arg(long)]
    budget_exempt: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run ticks until interrupted
    Run {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Delay between ticks in milliseconds
        #[arg(long, env = "KERNEL_TICK_INTERVAL_MS", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
        interval_ms: u64,
    },
    /// Print the persisted state document
    Show,
    /// Erase all persisted state
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let mut store = FileStore::open(&args.state)?;

    match &args.command {
        Some(Command::Show) => {
            let document = serde_json::to_string_pretty(&store.document()).into_diagnostic()?;
            println!("{}", document);
        }
        Some(Command::Reset) => {
            store.clear();
            store.flush()?;
            info!(path = %args.state.display(), "Persisted state erased");
        }
        Some(Command::Run { ticks, interval_ms }) => {
            run(&args, &mut store, *ticks, *interval_ms).await?;
        }
        None => {
            run(&args, &mut store, None, DEFAULT_TICK_INTERVAL_MS).await?;
        }
    }

    Ok(())
}

async fn run(
    args: &Args,
    store: &mut FileStore,
    ticks: Option<u64>,
    interval_ms: u64,
) -> Result<()> {
    let config = KernelConfig::from_env()?;
    let config = KernelConfig {
        budget_exempt: config.budget_exempt || args.budget_exempt,
        ..config
    };

    let registry = ProcessTypeRegistry::new();
    workloads::register(&registry);

    let last_tick = store.get(HOST_TICK_KEY).and_then(|v| v.as_u64()).unwrap_or(0);
    let clock = ManualClock::new(last_tick);
    let budget = WallClockBudget::new(args.cpu_limit);

    let mut kernel = Kernel::builder()
        .with_registry(registry)
        .with_clock(clock.clone())
        .with_budget(budget.clone())
        .with_config(config)
        .build();

    bootstrap(&mut kernel, store)?;

    info!(
        path = %args.state.display(),
        tick = last_tick,
        interval_ms,
        "Kernel entering main loop"
    );
    info!("Press Ctrl+C to exit");

    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut completed: u64 = 0;

    // One listener for the whole loop so a Ctrl+C during a tick is not lost
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        let tick = clock.advance();
        budget.restart();
        store.set(HOST_TICK_KEY, tick.into());

        match kernel.tick(store) {
            Ok(report) => info!(tick, "{}", report),
            Err(e) => error!(tick, error = %e, "Tick aborted"),
        }
        store.flush()?;

        completed += 1;
        if ticks.map_or(false, |limit| completed >= limit) {
            break;
        }
    }

    info!(ticks = completed, "Kernel stopped");
    Ok(())
}

/// Seed the root process on first start
fn bootstrap(kernel: &mut Kernel, store: &mut FileStore) -> Result<()> {
    kernel.load(store);
    if kernel.is_live(ROOT_PID) {
        return Ok(());
    }

    let root = Spawn::new(ROOT_PID, Box::new(workloads::Init)).with_pid(ROOT_PID);
    kernel.add_process(root, Priority::Always);
    kernel.store(store);
    store.flush()?;

    info!("Seeded root process");
    Ok(())
}
