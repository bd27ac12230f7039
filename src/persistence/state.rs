/*!
 * Persisted Kernel State
 * Self-healing decode and encode of the three persisted keys
 */

use super::record::ProcessRecord;
use super::store::Store;
use crate::core::limits::{PID_COUNTER_KEY, PROCESS_MEMORY_KEY, PROCESS_TABLE_KEY};
use crate::core::types::Pid;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Memory handed to a process that has none yet
#[inline]
#[must_use]
pub fn empty_memory() -> Value {
    Value::Object(Map::new())
}

/// Everything the kernel reads from the store at tick start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub pid_counter: Pid,
    pub records: Vec<ProcessRecord>,
    pub memory: BTreeMap<Pid, Value>,
    /// Keys that were missing or malformed and fell back to defaults
    pub repaired: Vec<&'static str>,
}

impl PersistedState {
    /// Read and validate all three keys
    ///
    /// Never fails: a missing or wrong-shaped key falls back to its empty
    /// default, a malformed record is skipped, and a memory key that is not
    /// a PID is dropped.
    pub fn decode(store: &dyn Store) -> Self {
        let mut repaired = Vec::new();

        let pid_counter = match store
            .get(PID_COUNTER_KEY)
            .and_then(|v| v.as_u64())
            .and_then(|n| Pid::try_from(n).ok())
        {
            Some(counter) => counter,
            None => {
                debug!(key = PID_COUNTER_KEY, "Resetting PID counter to 0");
                repaired.push(PID_COUNTER_KEY);
                0
            }
        };

        let records = match store.get(PROCESS_TABLE_KEY) {
            Some(Value::Array(items)) => decode_records(&items),
            _ => {
                debug!(key = PROCESS_TABLE_KEY, "Resetting process table to empty");
                repaired.push(PROCESS_TABLE_KEY);
                Vec::new()
            }
        };

        let memory = match store.get(PROCESS_MEMORY_KEY) {
            Some(Value::Object(map)) => decode_memory(map),
            _ => {
                debug!(key = PROCESS_MEMORY_KEY, "Resetting process memory to empty");
                repaired.push(PROCESS_MEMORY_KEY);
                BTreeMap::new()
            }
        };

        Self {
            pid_counter,
            records,
            memory,
            repaired,
        }
    }

    /// Write all three keys
    pub fn encode(&self, store: &mut dyn Store) {
        store.set(PID_COUNTER_KEY, Value::from(self.pid_counter));
        store.set(PROCESS_TABLE_KEY, encode_records(&self.records));
        store.set(PROCESS_MEMORY_KEY, encode_memory(&self.memory));
    }

    /// Write back the defaults chosen for repaired keys
    pub fn write_repairs(&self, store: &mut dyn Store) {
        for key in &self.repaired {
            match *key {
                PID_COUNTER_KEY => store.set(key, Value::from(self.pid_counter)),
                PROCESS_TABLE_KEY => store.set(key, Value::Array(Vec::new())),
                PROCESS_MEMORY_KEY => store.set(key, empty_memory()),
                _ => {}
            }
        }
    }
}

fn decode_records(items: &[Value]) -> Vec<ProcessRecord> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match ProcessRecord::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed process record");
                None
            }
        })
        .collect()
}

fn decode_memory(map: Map<String, Value>) -> BTreeMap<Pid, Value> {
    map.into_iter()
        .filter_map(|(key, value)| match key.parse::<Pid>() {
            Ok(pid) => Some((pid, value)),
            Err(_) => {
                debug!(key = %key, "Dropping memory entry with non-PID key");
                None
            }
        })
        .collect()
}

/// Encode a record list
pub fn encode_records(records: &[ProcessRecord]) -> Value {
    // Records only hold integers, strings and SleepInfo; none can fail to encode
    Value::Array(
        records
            .iter()
            .filter_map(|record| serde_json::to_value(record).ok())
            .collect(),
    )
}

/// Encode a PID-keyed memory map
pub fn encode_memory(memory: &BTreeMap<Pid, Value>) -> Value {
    Value::Object(
        memory
            .iter()
            .map(|(pid, value)| (pid.to_string(), value.clone()))
            .collect(),
    )
}
