/*!
 * Kernel Configuration
 *
 * Runtime configuration for PID allocation, budget gating and fault handling
 */

use crate::core::errors::KernelError;
use crate::core::limits::DEFAULT_PID_CEILING;
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Highest PID handed out before the allocator wraps to 0
    pub pid_ceiling: Pid,
    /// Ignore the budget meter entirely (simulation and test hosts)
    pub budget_exempt: bool,
    /// Kill a process whose `run` fails instead of aborting the tick
    pub isolate_faults: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            pid_ceiling: DEFAULT_PID_CEILING,
            budget_exempt: false,
            isolate_faults: true,
        }
    }
}

impl KernelConfig {
    #[inline]
    #[must_use]
    pub fn with_pid_ceiling(mut self, ceiling: Pid) -> Self {
        self.pid_ceiling = ceiling;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_budget_exempt(mut self, exempt: bool) -> Self {
        self.budget_exempt = exempt;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_fault_isolation(mut self, isolate: bool) -> Self {
        self.isolate_faults = isolate;
        self
    }

    /// Load overrides from the process environment
    ///
    /// Environment variables:
    /// - KERNEL_PID_CEILING: highest PID before wraparound (>= 1)
    /// - KERNEL_BUDGET_EXEMPT: skip the CPU budget check (1/true)
    /// - KERNEL_ISOLATE_FAULTS: kill failing processes instead of aborting (1/true)
    pub fn from_env() -> Result<Self, KernelError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, starting from the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KernelError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("KERNEL_PID_CEILING") {
            let ceiling: Pid = raw.trim().parse().map_err(|_| {
                KernelError::Configuration(format!("KERNEL_PID_CEILING is not a PID: {}", raw))
            })?;
            if ceiling == 0 {
                return Err(KernelError::Configuration(
                    "KERNEL_PID_CEILING must be at least 1".into(),
                ));
            }
            config.pid_ceiling = ceiling;
        }

        if let Some(raw) = lookup("KERNEL_BUDGET_EXEMPT") {
            config.budget_exempt = parse_flag("KERNEL_BUDGET_EXEMPT", &raw)?;
        }

        if let Some(raw) = lookup("KERNEL_ISOLATE_FAULTS") {
            config.isolate_faults = parse_flag("KERNEL_ISOLATE_FAULTS", &raw)?;
        }

        Ok(config)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, KernelError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(KernelError::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, raw
        ))),
    }
}
