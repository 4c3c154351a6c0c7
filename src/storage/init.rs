//! Storage initialization
//!
//! First-run setup: directories, default settings and an empty collection.

use tracing::info;

use crate::config::paths::TrackerPaths;
use crate::config::Settings;
use crate::error::ExpenseResult;

use super::expenses::ExpenseRepository;

/// Initialize storage for a fresh installation
///
/// Returns `false` when everything already existed. Existing files are
/// never overwritten.
pub fn initialize_storage(paths: &TrackerPaths) -> ExpenseResult<bool> {
    paths.ensure_directories()?;
    let mut created = false;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
        created = true;
    }

    if !paths.expenses_file().exists() {
        ExpenseRepository::new(paths.expenses_file()).try_save(&[])?;
        created = true;
    }

    if created {
        info!(base = %paths.base_dir().display(), "initialized storage");
    }
    Ok(created)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &TrackerPaths) -> bool {
    !paths.settings_file().exists() || !paths.expenses_file().exists()
}
