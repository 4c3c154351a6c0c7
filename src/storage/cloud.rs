//! Persistence for the cloud simulation state (`data/cloud.json`)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cloud::CloudState;
use crate::error::ExpenseResult;

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone)]
pub struct CloudStateRepository {
    path: PathBuf,
}

impl CloudStateRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, or a fresh one if none exists yet
    pub fn load(&self) -> ExpenseResult<CloudState> {
        let state: CloudState = read_json(&self.path)?;
        debug!(
            jobs = state.jobs.len(),
            schedules = state.schedules.len(),
            "loaded cloud state"
        );
        Ok(state)
    }

    pub fn save(&self, state: &CloudState) -> ExpenseResult<()> {
        write_json_atomic(&self.path, state)
    }
}
