//! Replay log persistence.
//!
//! Turn records are stored as JSON lines - one record per line - so a
//! session can be inspected with standard tooling and replayed against the
//! same seed for verification.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One turn of a combat session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn number (1-based).
    pub turn: u32,

    /// Hand totals as rolled (after modifiers and the OnRoll pass).
    pub rolls: Vec<i32>,

    /// Hand slots played, in play order.
    pub plays: Vec<usize>,
}

/// Replay log persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay io: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// File-based replay log.
///
/// Records are stored as `replay.jsonl` under the base directory.
pub struct FileReplayLog {
    path: PathBuf,
}

impl FileReplayLog {
    /// Creates a replay log under `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            path: base_dir.join("replay.jsonl"),
        })
    }

    /// Appends one record.
    pub fn append(&self, record: &TurnRecord) -> Result<(), ReplayError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        tracing::debug!(turn = record.turn, path = %self.path.display(), "turn recorded");
        Ok(())
    }

    /// Writes a whole session's history, replacing any existing log.
    pub fn save_all(&self, records: &[TurnRecord]) -> Result<(), ReplayError> {
        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }
        fs::write(&self.path, buffer)?;
        tracing::debug!(count = records.len(), path = %self.path.display(), "replay saved");
        Ok(())
    }

    /// Loads every record in the log.
    pub fn load(&self) -> Result<Vec<TurnRecord>, ReplayError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}
