/*!
 * PID Allocation Properties
 * Randomized add/kill/reload sequences never hand out a PID that is in use
 */

use proptest::prelude::*;
use std::collections::BTreeSet;
use tick_kernel::{
    Kernel, KernelConfig, MemoryStore, Pid, Priority, Process, ProcessContext, ProcessResult,
    ProcessTypeRegistry, Spawn,
};

struct Idle;

impl Process for Idle {
    fn type_name(&self) -> &'static str {
        "Idle"
    }

    fn run(&mut self, _ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add,
    Kill(usize),
    Reload,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Add),
        2 => any::<usize>().prop_map(Op::Kill),
        1 => Just(Op::Reload),
    ]
}

proptest! {
    #[test]
    fn test_allocated_pids_are_unique(ceiling in 1u32..12, ops in prop::collection::vec(op(), 1..80)) {
        let registry = ProcessTypeRegistry::new();
        registry.register("Idle", |_, _| Box::new(Idle) as Box<dyn Process>);
        let mut kernel = Kernel::builder()
            .with_registry(registry)
            .with_config(KernelConfig::default().with_pid_ceiling(ceiling))
            .build();
        let mut store = MemoryStore::new();

        // PIDs held by a table entry, dead ones included until reload
        let mut taken: BTreeSet<Pid> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Add => {
                    let pid = kernel.add_process(Spawn::new(0, Box::new(Idle)), Priority::Normal);
                    prop_assert!(taken.insert(pid), "PID {} handed out twice", pid);
                }
                Op::Kill(index) => {
                    let live: Vec<Pid> = kernel
                        .processes()
                        .into_iter()
                        .filter(|info| info.is_live())
                        .map(|info| info.pid)
                        .collect();
                    if !live.is_empty() {
                        kernel.kill_process(live[index % live.len()]);
                    }
                }
                Op::Reload => {
                    kernel.store(&mut store);
                    kernel.load(&mut store);
                    taken = kernel.processes().into_iter().map(|info| info.pid).collect();
                }
            }
            prop_assert_eq!(kernel.len(), taken.len());
        }
    }
}
