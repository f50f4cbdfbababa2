use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_STATE_PATH: &str = "watch_state.json";

/// Snapshot carried between runs. Exactly one exists per deployment;
/// read once at run start, written once at run end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchState {
    pub last_in_stock: bool,
    pub last_fingerprint: String,

    /// Civil date (YYYY-MM-DD) of the most recent daily report, or empty
    /// if none has been sent yet.
    pub last_daily_report_date: String,
}

#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Never fails: a missing, unreadable, or malformed state file resets
    /// to defaults. Worst case after corruption is one duplicate daily
    /// report, which beats refusing to run.
    pub fn load(&self) -> WatchState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %err,
                        "state file unreadable; starting from defaults"
                    );
                }
                return WatchState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "state file malformed; starting from defaults"
                );
                WatchState::default()
            }
        }
    }

    pub fn save(&self, state: &WatchState) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(state).context("serialize watch state failed")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write watch state to {} failed", self.path.display()))?;
        Ok(())
    }
}
