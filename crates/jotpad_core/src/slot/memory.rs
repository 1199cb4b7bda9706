//! In-memory slot store.

use crate::slot::slot_store::{validate_key, SlotResult, SlotStore};
use std::collections::BTreeMap;

/// Slot store kept entirely in process memory.
///
/// Used by tests and throwaway sessions; contents vanish on drop.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: BTreeMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one slot pre-populated.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut slots = BTreeMap::new();
        slots.insert(key.into(), value.into());
        Self { slots }
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> SlotResult<Option<String>> {
        validate_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> SlotResult<()> {
        validate_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> SlotResult<()> {
        validate_key(key)?;
        self.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySlotStore;
    use crate::slot::slot_store::{SlotError, SlotStore};

    #[test]
    fn write_replaces_and_clear_removes() {
        let mut store = MemorySlotStore::new();
        assert_eq!(store.read("notes").unwrap(), None);

        store.write("notes", "one").unwrap();
        store.write("notes", "two").unwrap();
        assert_eq!(store.read("notes").unwrap().as_deref(), Some("two"));

        store.clear("notes").unwrap();
        assert_eq!(store.read("notes").unwrap(), None);
    }

    #[test]
    fn blank_key_is_rejected() {
        let mut store = MemorySlotStore::new();
        let err = store.write("  ", "value").unwrap_err();
        assert!(matches!(err, SlotError::InvalidKey(_)));
    }
}
