/*!
 * Process Records
 * Wire form of a persisted process: `[pid, parentPID, typeName, priority, sleepInfo?]`
 */

use crate::core::types::Pid;
use crate::process::core::types::{Priority, SleepInfo};
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// One persisted process
///
/// Serialized as a JSON array. The sleep record is written only for asleep
/// processes; on read a trailing `null` or a malformed sleep record reads
/// as awake, and anything past the fifth element is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub parent_pid: Pid,
    pub type_name: String,
    pub priority: Priority,
    pub sleep: Option<SleepInfo>,
}

impl ProcessRecord {
    #[inline]
    #[must_use]
    pub fn new(pid: Pid, parent_pid: Pid, type_name: impl Into<String>, priority: Priority) -> Self {
        Self {
            pid,
            parent_pid,
            type_name: type_name.into(),
            priority,
            sleep: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_sleep(mut self, sleep: SleepInfo) -> Self {
        self.sleep = Some(sleep);
        self
    }
}

impl Serialize for ProcessRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.sleep.is_some() { 5 } else { 4 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.pid)?;
        seq.serialize_element(&self.parent_pid)?;
        seq.serialize_element(&self.type_name)?;
        seq.serialize_element(&self.priority)?;
        if let Some(sleep) = &self.sleep {
            seq.serialize_element(sleep)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ProcessRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ProcessRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a process record [pid, parentPID, typeName, priority, sleepInfo?]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let pid: Pid = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let parent_pid: Pid = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let type_name: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(2, &self))?;
                let priority: Priority = seq.next_element()?.unwrap_or_default();
                let sleep = match seq.next_element::<Value>()? {
                    None | Some(Value::Null) => None,
                    Some(raw) => match SleepInfo::deserialize(&raw) {
                        Ok(info) => Some(info),
                        Err(e) => {
                            // Keep the process, and with it its children
                            warn!(
                                pid,
                                sleep_info = %raw,
                                error = %e,
                                "Malformed sleep info, treating process as awake"
                            );
                            None
                        }
                    },
                };

                while seq.next_element::<IgnoredAny>()?.is_some() {}

                Ok(ProcessRecord {
                    pid,
                    parent_pid,
                    type_name,
                    priority,
                    sleep,
                })
            }
        }

        deserializer.deserialize_seq(RecordVisitor)
    }
}
