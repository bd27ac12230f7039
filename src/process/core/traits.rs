/*!
 * Process Traits
 * The contract every scheduled workload implements
 */

use crate::core::errors::ProcessResult;
use crate::process::scheduler::ProcessContext;

/// A unit of persisted, scheduled work
///
/// Instances are rebuilt from their records at every load, so a workload
/// must keep anything that has to survive a tick in its memory (reachable
/// through the context), not in its own fields.
///
/// # Example
///
/// ```ignore
/// struct Harvester;
///
/// impl Process for Harvester {
///     fn type_name(&self) -> &'static str {
///         "Harvester"
///     }
///
///     fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()> {
///         let mut trips: u64 = ctx.load_memory()?;
///         trips += 1;
///         ctx.save_memory(&trips)?;
///         ctx.sleep(SleepDuration::Ticks(10))
///     }
/// }
/// ```
pub trait Process: Send {
    /// Stable name the type is registered under
    fn type_name(&self) -> &'static str;

    /// Do one tick's worth of work
    fn run(&mut self, ctx: &mut ProcessContext<'_>) -> ProcessResult<()>;
}
