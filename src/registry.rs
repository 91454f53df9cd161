//! Per-device metric alias registry.
//!
//! Every device (the edge node included) gets its own registry mapping metric
//! names to a stable alias, the datatype declared in the BIRTH certificate and
//! the last value seen. Aliases are handed out from 0 in first-seen order and
//! are never reused.

use crate::classify::TypedMetric;
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::types::{DataType, ScalarValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What the registry knows about one metric of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Alias announced in BIRTH and used in every DATA.
    pub alias: u64,
    /// Datatype announced in BIRTH.
    pub datatype: DataType,
    /// Most recent value, replayed when a BIRTH is reissued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_value: Option<ScalarValue>,
}

impl RegistryEntry {
    /// The stored value, if it still matches the registered datatype.
    pub fn replay_value(&self) -> Option<ScalarValue> {
        self.last_value
            .clone()
            .and_then(|value| value.coerce(self.datatype))
    }
}

/// Alias registry of a single device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    next_alias: u64,
}

fn alias_key(device_id: &str) -> String {
    format!("alias:{}", device_id)
}

fn next_alias_key(device_id: &str) -> String {
    format!("nextAlias:{}", device_id)
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the registry of `device_id`, or an empty one if none is stored.
    ///
    /// Corrupt state is logged and treated as empty.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, device_id: &str) -> Self {
        let entries: BTreeMap<String, RegistryEntry> = match store.get(&alias_key(device_id)) {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::String(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                log::warn!("discarding corrupt alias registry for {}: {}", device_id, err);
                BTreeMap::new()
            }),
            Some(other) => {
                log::warn!("discarding alias registry for {}: not a string: {}", device_id, other);
                BTreeMap::new()
            }
        };

        let stored_next = store
            .get(&next_alias_key(device_id))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let next_alias = stored_next.max(alias_floor(&entries));

        Self { entries, next_alias }
    }

    /// Persists the registry and its next free alias (`max(alias) + 1`, or 0).
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, device_id: &str) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        store.set(&alias_key(device_id), Value::String(raw));
        store.set(&next_alias_key(device_id), Value::from(alias_floor(&self.entries)));
        Ok(())
    }

    /// Registers unseen metrics and records the latest value of every incoming one.
    ///
    /// Returns the updated registry and whether a BIRTH certificate has to be
    /// (re)issued: that is the case when the registry was empty or when at
    /// least one metric was new.
    pub fn assign_or_update(mut self, incoming: &[TypedMetric]) -> (Self, bool) {
        let mut needs_birth = self.entries.is_empty();

        for metric in incoming {
            match self.entries.get_mut(&metric.name) {
                Some(entry) => {
                    if entry.datatype != metric.datatype() {
                        log::debug!(
                            "metric {} registered as {:?} now carries {:?}",
                            metric.name,
                            entry.datatype,
                            metric.datatype()
                        );
                    }
                    entry.last_value = Some(metric.value.clone());
                }
                None => {
                    self.entries.insert(
                        metric.name.clone(),
                        RegistryEntry {
                            alias: self.next_alias,
                            datatype: metric.datatype(),
                            last_value: Some(metric.value.clone()),
                        },
                    );
                    self.next_alias += 1;
                    needs_birth = true;
                }
            }
        }

        (self, needs_birth)
    }

    /// Looks up a metric by name.
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// All registered metrics, ordered by alias.
    pub fn entries_by_alias(&self) -> Vec<(&str, &RegistryEntry)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_by_key(|(_, entry)| entry.alias);
        entries
    }

    /// The alias the next new metric will receive.
    pub fn next_alias(&self) -> u64 {
        self.next_alias
    }

    /// Returns the number of registered metrics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no metric has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn alias_floor(entries: &BTreeMap<String, RegistryEntry>) -> u64 {
    entries
        .values()
        .map(|entry| entry.alias + 1)
        .max()
        .unwrap_or(0)
}
