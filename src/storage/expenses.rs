//! Expense repository for JSON storage
//!
//! The whole collection lives in one file (`expenses.json`) as a single JSON
//! array. It is read once at startup and overwritten wholesale on every
//! mutation; there are no incremental writes and no indexes.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::ExpenseResult;
use crate::models::Expense;

use super::file_io::{read_json, write_json_atomic};

/// A passive mirror of the expense collection
///
/// Implementations never surface failures: `load` degrades to an empty
/// collection and `save` becomes a logged no-op.
pub trait ExpensePersistence {
    /// Read the persisted collection, or an empty one if nothing usable exists
    fn load(&self) -> Vec<Expense>;

    /// Overwrite the persisted collection
    fn save(&self, expenses: &[Expense]);
}

/// File-backed persistence for the expense collection
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    path: PathBuf,
}

impl ExpenseRepository {
    /// Create a repository over the given file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection, reporting read and parse failures
    pub fn try_load(&self) -> ExpenseResult<Vec<Expense>> {
        read_json(&self.path)
    }

    /// Save the collection, reporting write failures
    pub fn try_save(&self, expenses: &[Expense]) -> ExpenseResult<()> {
        write_json_atomic(&self.path, expenses)
    }
}

impl ExpensePersistence for ExpenseRepository {
    fn load(&self) -> Vec<Expense> {
        match self.try_load() {
            Ok(expenses) => {
                debug!(count = expenses.len(), path = %self.path.display(), "loaded expenses");
                expenses
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "error loading expenses");
                Vec::new()
            }
        }
    }

    fn save(&self, expenses: &[Expense]) {
        match self.try_save(expenses) {
            Ok(()) => debug!(count = expenses.len(), "saved expenses"),
            Err(e) => error!(path = %self.path.display(), error = %e, "error saving expenses"),
        }
    }
}
