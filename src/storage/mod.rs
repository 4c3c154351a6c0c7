//! Storage layer for the expense tracker
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. The expense collection is mirrored through the
//! [`ExpensePersistence`] trait; simulation state has its own repository.

pub mod cloud;
pub mod expenses;
pub mod file_io;
pub mod init;
pub mod memory;

pub use cloud::CloudStateRepository;
pub use expenses::{ExpensePersistence, ExpenseRepository};
pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, needs_initialization};
pub use memory::MemoryPersistence;

use crate::config::paths::TrackerPaths;
use crate::error::ExpenseError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TrackerPaths,
    pub expenses: ExpenseRepository,
    pub cloud: CloudStateRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TrackerPaths) -> Result<Self, ExpenseError> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            cloud: CloudStateRepository::new(paths.cloud_state_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TrackerPaths {
        &self.paths
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
        assert!(storage.expenses.path().ends_with("data/expenses.json"));
        assert!(storage.cloud.path().ends_with("data/cloud.json"));
    }
}
