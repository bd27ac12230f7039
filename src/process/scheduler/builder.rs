/*!
 * Kernel Builder
 * Builder pattern for Kernel construction
 */

use super::{Kernel, KernelConfig};
use crate::process::lifecycle::{BudgetMeter, Clock, FixedBudget, ManualClock};
use crate::process::registry::ProcessTypeRegistry;
use tracing::info;

/// Builder for Kernel
pub struct KernelBuilder {
    registry: Option<ProcessTypeRegistry>,
    clock: Option<Box<dyn Clock>>,
    budget: Option<Box<dyn BudgetMeter>>,
    config: KernelConfig,
}

impl KernelBuilder {
    /// Create a new Kernel builder
    pub fn new() -> Self {
        Self {
            registry: None,
            clock: None,
            budget: None,
            config: KernelConfig::default(),
        }
    }

    /// Use a shared process type registry
    pub fn with_registry(mut self, registry: ProcessTypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use the host's tick clock
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Use the host's CPU budget meter
    pub fn with_budget(mut self, budget: impl BudgetMeter + 'static) -> Self {
        self.budget = Some(Box::new(budget));
        self
    }

    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the Kernel
    pub fn build(self) -> Kernel {
        let registry = self.registry.unwrap_or_default();
        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(ManualClock::default()));
        let budget = self
            .budget
            .unwrap_or_else(|| Box::new(FixedBudget::unlimited()));

        info!(
            types = registry.len(),
            pid_ceiling = self.config.pid_ceiling,
            budget_exempt = self.config.budget_exempt,
            isolate_faults = self.config.isolate_faults,
            "Kernel initialized"
        );

        Kernel::from_parts(registry, clock, budget, self.config)
    }
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new()
    }
}
