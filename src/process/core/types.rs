/*!
 * Process Types
 * Priority classes, sleep bookkeeping and status for scheduled processes
 */

use crate::core::limits::SLEEP_FOREVER;
use crate::core::types::{Pid, Tick};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Scheduling class, fixed at creation
///
/// Classes run in declaration order: every `Always` process is dequeued
/// before any `High` one, and so on down to `Low`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Runs every tick ahead of everything else
    Always = 0,
    High = 1,
    #[default]
    Normal = 2,
    Low = 3,
}

impl Priority {
    /// All classes in execution order
    pub const ALL: [Priority; 4] = [
        Priority::Always,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];

    /// Number of priority classes
    pub const COUNT: usize = Self::ALL.len();

    /// Queue index for this class
    ///
    /// # Performance
    /// Hot path - called for every process bucketed during load
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Persisted integer form
    #[inline(always)]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a persisted priority; unknown integers fall into the lowest class
    #[must_use]
    pub const fn from_wire(value: i64) -> Self {
        match value {
            0 => Priority::Always,
            1 => Priority::High,
            2 => Priority::Normal,
            _ => Priority::Low,
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Always => "always",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<i64>::deserialize(deserializer)?;
        Ok(value.map_or(Priority::Normal, Priority::from_wire))
    }
}

/// How long a process stays asleep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SleepDuration {
    /// Skip this many ticks, counted from the tick the sleep began
    Ticks(u64),
    /// Never auto-wake; only a kill ends the sleep
    Forever,
}

impl SleepDuration {
    /// Decode the wire integer (`-1` means forever)
    #[must_use]
    pub const fn from_wire(value: i64) -> Self {
        if value == SLEEP_FOREVER {
            SleepDuration::Forever
        } else if value < 0 {
            SleepDuration::Ticks(0)
        } else {
            SleepDuration::Ticks(value as u64)
        }
    }

    /// Encode as the wire integer
    #[must_use]
    pub fn to_wire(self) -> i64 {
        match self {
            SleepDuration::Forever => SLEEP_FOREVER,
            SleepDuration::Ticks(ticks) => i64::try_from(ticks).unwrap_or(i64::MAX),
        }
    }
}

impl From<i64> for SleepDuration {
    fn from(value: i64) -> Self {
        Self::from_wire(value)
    }
}

impl Serialize for SleepDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for SleepDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(Self::from_wire(value))
    }
}

/// Sleep record carried by an asleep process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepInfo {
    pub start: Tick,
    pub duration: SleepDuration,
}

impl SleepInfo {
    #[inline]
    #[must_use]
    pub const fn new(start: Tick, duration: SleepDuration) -> Self {
        Self { start, duration }
    }

    /// Check whether the sleep is over at `now`
    ///
    /// Sleeping at tick `s` for `d` ticks skips ticks `s..s+d` and makes the
    /// process runnable again at tick `s + d`.
    #[inline]
    #[must_use]
    pub const fn has_elapsed(&self, now: Tick) -> bool {
        match self.duration {
            SleepDuration::Forever => false,
            SleepDuration::Ticks(ticks) => self.start.saturating_add(ticks) <= now,
        }
    }
}

/// Process status
///
/// `Dead` is terminal. The sleep record only exists inside `Asleep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Alive,
    Asleep(SleepInfo),
    Dead,
}

impl ProcessStatus {
    #[inline(always)]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self, ProcessStatus::Alive)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_asleep(&self) -> bool {
        matches!(self, ProcessStatus::Asleep(_))
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self, ProcessStatus::Dead)
    }

    /// Alive or asleep
    #[inline(always)]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !self.is_dead()
    }

    #[inline]
    #[must_use]
    pub const fn sleep_info(&self) -> Option<&SleepInfo> {
        match self {
            ProcessStatus::Asleep(info) => Some(info),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Alive => "alive",
            ProcessStatus::Asleep(_) => "asleep",
            ProcessStatus::Dead => "dead",
        }
    }
}

/// Snapshot of a process table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub parent_pid: Pid,
    pub type_name: String,
    pub priority: Priority,
    pub status: ProcessStatus,
}

impl ProcessInfo {
    #[inline(always)]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.status.is_live()
    }
}
