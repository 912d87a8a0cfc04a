use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Identifiers of every load already relayed, persisted as a flat JSON
/// object mapping load id to `true`. Entries are never removed, so the file
/// grows for the life of the deployment.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SeenLoads(HashMap<String, bool>);

impl SeenLoads {
    pub fn is_new(&self, load_id: &str) -> bool {
        !self.0.contains_key(load_id)
    }

    pub fn mark(&mut self, load_id: &str) {
        self.0.insert(load_id.to_string(), true);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Reads and writes the seen-load set on disk.
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted set. A missing file is a fresh deployment, not an
    /// error; an unreadable or corrupt file is.
    pub fn load(&self) -> Result<SeenLoads> {
        if !self.path.exists() {
            return Ok(SeenLoads::default());
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))
    }

    /// Persist the full set. Writes a sibling temp file and renames it over
    /// the target so a crash mid-write cannot truncate the previous state.
    pub fn save(&self, seen: &SeenLoads) -> Result<()> {
        let data =
            serde_json::to_string_pretty(seen).context("Failed to serialize seen-load set")?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace state file: {}", self.path.display()))?;
        Ok(())
    }
}
