//! In-memory persistence
//!
//! Holds the serialized collection in a single string slot, the same shape
//! the file repository writes. Handy for embedding the store and for tests.

use std::cell::{Cell, RefCell};

use tracing::error;

use crate::models::Expense;

use super::expenses::ExpensePersistence;

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: RefCell<Option<String>>,
    writes: Cell<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw slot contents (which may be invalid JSON)
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: RefCell::new(Some(raw.into())),
            writes: Cell::new(0),
        }
    }

    /// Number of completed saves
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl ExpensePersistence for MemoryPersistence {
    fn load(&self) -> Vec<Expense> {
        match self.slot.borrow().as_deref() {
            None => Vec::new(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                error!(error = %e, "error loading expenses from memory slot");
                Vec::new()
            }),
        }
    }

    fn save(&self, expenses: &[Expense]) {
        match serde_json::to_string(expenses) {
            Ok(raw) => {
                *self.slot.borrow_mut() = Some(raw);
                self.writes.set(self.writes.get() + 1);
            }
            Err(e) => error!(error = %e, "error saving expenses to memory slot"),
        }
    }
}
