// ABOUTME: Rerun marker asking the pipeline to invoke the job again.
// ABOUTME: A JSON file named `rerun` under the directory in $WORK.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const WORK_ENV: &str = "WORK";
pub const MARKER_FILENAME: &str = "rerun";

#[derive(Debug, Error)]
pub enum RerunError {
    #[error("WORK environment variable is not set")]
    WorkNotSet,

    #[error("failed to write rerun marker {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize rerun marker: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Who asked for a rerun, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerunInfo {
    /// Hostname of the machine that wrote the marker.
    pub holder: String,
    pub pid: u32,
    pub requested_at: DateTime<Utc>,
    /// DB instance the pass was reconciling.
    pub identifier: String,
    pub reason: String,
}

impl RerunInfo {
    pub fn new(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            requested_at: Utc::now(),
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }
}

/// Location of the rerun marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerunMarker {
    dir: PathBuf,
}

impl RerunMarker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Marker under the directory named by `$WORK`.
    pub fn from_env() -> Result<Self, RerunError> {
        std::env::var_os(WORK_ENV)
            .filter(|v| !v.is_empty())
            .map(Self::new)
            .ok_or(RerunError::WorkNotSet)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(MARKER_FILENAME)
    }

    /// Write the marker, replacing any previous one.
    pub fn mark(&self, info: &RerunInfo) -> Result<PathBuf, RerunError> {
        let path = self.path();
        let json = serde_json::to_string_pretty(info)?;
        write_file(&path, &json)?;
        Ok(path)
    }

    /// Any file at the marker path counts, whatever its content.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Parsed marker contents, if the marker holds valid JSON.
    pub fn read(&self) -> Option<RerunInfo> {
        let content = std::fs::read_to_string(self.path()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), RerunError> {
    std::fs::write(path, content).map_err(|source| RerunError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether a previous step in this job requested a rerun.
pub fn should_rerun() -> Result<bool, RerunError> {
    Ok(RerunMarker::from_env()?.exists())
}
