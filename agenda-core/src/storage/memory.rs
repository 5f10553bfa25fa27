//! In-process storage, for embedding and tests.

use std::cell::RefCell;
use std::collections::HashMap;

use super::Storage;
use crate::error::AgendaResult;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RefCell<HashMap<String, String>>,
    writes: RefCell<HashMap<String, usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document without counting it as a write.
    pub fn with_document(self, key: &str, value: &str) -> Self {
        self.documents
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Number of writes (including removals) issued for `key`.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.borrow().get(key).copied().unwrap_or(0)
    }

    fn record_write(&self, key: &str) {
        *self.writes.borrow_mut().entry(key.to_string()).or_insert(0) += 1;
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> AgendaResult<Option<String>> {
        Ok(self.documents.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> AgendaResult<()> {
        self.documents
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.record_write(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> AgendaResult<()> {
        self.documents.borrow_mut().remove(key);
        self.record_write(key);
        Ok(())
    }
}
