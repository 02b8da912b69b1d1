use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{CallerChain, CallerFrame, ImportDescriptor};
use crate::error::{GuardError, Result};

/// A recorded load attempt.
///
/// `chain` is root first. Depths and sticky laziness are recomputed on
/// replay, so recorded `depth` values are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadEvent {
    pub import: ImportDescriptor,
    #[serde(default)]
    pub chain: Vec<CallerFrame>,
}

impl LoadEvent {
    pub fn caller_chain(&self) -> CallerChain {
        CallerChain::from_frames(self.chain.clone())
    }
}

/// Read newline-delimited events, skipping blank lines.
pub fn read_events(path: &Path) -> Result<Vec<LoadEvent>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(GuardError::from))
        .collect()
}
