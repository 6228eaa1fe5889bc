//! Mutation journal for section teardown.
//!
//! The first time a section writes a property, the value it held just
//! before is recorded. Reverting restores every recorded value so an
//! unmounted section leaves no trace, whatever state it was in.

use indexmap::IndexMap;

use crate::host::ElementHost;
use crate::value::Value;

#[derive(Clone, Debug, Default)]
pub struct MutationJournal {
    baselines: IndexMap<(String, String), Value>,
}

impl MutationJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the current value of (element, property) unless already
    /// recorded. Absent elements are not recorded.
    pub fn record(&mut self, host: &dyn ElementHost, element: &str, property: &str) {
        let key = (element.to_string(), property.to_string());
        if self.baselines.contains_key(&key) {
            return;
        }
        if let Some(value) = host.read(element, property) {
            self.baselines.insert(key, value);
        }
    }

    pub fn baseline(&self, element: &str, property: &str) -> Option<Value> {
        self.baselines
            .get(&(element.to_string(), property.to_string()))
            .copied()
    }

    /// Restore every recorded value (most recent first) and forget them.
    /// Returns what was written back.
    pub fn revert(&mut self, host: &mut dyn ElementHost) -> Vec<(String, String, Value)> {
        self.baselines
            .drain(..)
            .rev()
            .map(|((element, property), value)| {
                host.write(&element, &property, value);
                (element, property, value)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}
