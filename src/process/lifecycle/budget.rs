/*!
 * CPU Budget Tracking
 * Per-tick compute allowance measured by the host
 */

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Host meter for compute used in the current tick
///
/// Both readings are only meaningful inside the current invocation.
pub trait BudgetMeter: Send + Sync {
    /// Compute consumed so far this tick
    fn used(&self) -> f64;

    /// Compute allowed this tick
    fn limit(&self) -> f64;

    /// Budget-exempt hosts (sandboxes, simulations) never abort the run phase
    fn is_exempt(&self) -> bool {
        false
    }

    /// Check whether the run phase must stop before the next dequeue
    ///
    /// # Performance
    /// Hot path - consulted before every dequeue
    #[inline]
    fn is_exhausted(&self) -> bool {
        !self.is_exempt() && self.used() >= self.limit()
    }
}

/// Budget whose usage is set by hand
///
/// Clones share the same reading, so a test or host can move usage while
/// the kernel owns another handle.
#[derive(Debug, Clone)]
pub struct FixedBudget {
    used: Arc<Mutex<f64>>,
    limit: f64,
    exempt: bool,
}

impl FixedBudget {
    pub fn new(limit: f64) -> Self {
        Self {
            used: Arc::new(Mutex::new(0.0)),
            limit,
            exempt: false,
        }
    }

    /// Budget that can never be exhausted
    pub fn unlimited() -> Self {
        Self::new(f64::INFINITY)
    }

    /// Mark the budget exempt from the abort check
    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }

    pub fn set_used(&self, used: f64) {
        *self.used.lock() = used;
    }

    /// Add to the current usage
    pub fn consume(&self, amount: f64) {
        *self.used.lock() += amount;
    }

    /// Use up the whole allowance
    pub fn exhaust(&self) {
        self.set_used(self.limit);
    }

    /// Start a fresh tick
    pub fn reset(&self) {
        self.set_used(0.0);
    }
}

impl Default for FixedBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl BudgetMeter for FixedBudget {
    fn used(&self) -> f64 {
        *self.used.lock()
    }

    fn limit(&self) -> f64 {
        self.limit
    }

    fn is_exempt(&self) -> bool {
        self.exempt
    }
}

/// Budget measured as wall-clock milliseconds since the tick started
#[derive(Debug, Clone)]
pub struct WallClockBudget {
    started: Arc<Mutex<Instant>>,
    limit_ms: f64,
    exempt: bool,
}

impl WallClockBudget {
    pub fn new(limit_ms: f64) -> Self {
        Self {
            started: Arc::new(Mutex::new(Instant::now())),
            limit_ms,
            exempt: false,
        }
    }

    pub fn with_exempt(mut self, exempt: bool) -> Self {
        self.exempt = exempt;
        self
    }

    /// Restart the measurement at tick start
    pub fn restart(&self) {
        *self.started.lock() = Instant::now();
    }
}

impl BudgetMeter for WallClockBudget {
    fn used(&self) -> f64 {
        self.started.lock().elapsed().as_secs_f64() * 1000.0
    }

    fn limit(&self) -> f64 {
        self.limit_ms
    }

    fn is_exempt(&self) -> bool {
        self.exempt
    }
}
