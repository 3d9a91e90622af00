use areascope_core::{Measurement, MeasurementHistory};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const HISTORY_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("history file has schema version {found}, this build reads up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEnvelope {
    version: u32,
    measurements: Vec<Measurement>,
}

#[derive(Debug, Deserialize)]
struct VersionHeader {
    version: u32,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "AreaScope", "AreaScope")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_history(&self) -> Result<MeasurementHistory, StorageError> {
        let path = self.history_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no history file, starting empty");
            return Ok(MeasurementHistory::new());
        }

        let bytes = fs::read(&path)?;
        let header: VersionHeader = serde_json::from_slice(&bytes)?;
        if header.version > HISTORY_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: header.version,
                supported: HISTORY_SCHEMA_VERSION,
            });
        }
        let envelope: HistoryEnvelope = serde_json::from_slice(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            count = envelope.measurements.len(),
            "history loaded"
        );

        Ok(MeasurementHistory::from(envelope.measurements))
    }

    pub fn save_history(&self, history: &MeasurementHistory) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope = HistoryEnvelope {
            version: HISTORY_SCHEMA_VERSION,
            measurements: history.as_slice().to_vec(),
        };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        let path = self.history_path();

        // Replace the old file in one step so a failed write never truncates it
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;
        tracing::debug!(path = %path.display(), count = history.len(), "history saved");
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join("history.json")
    }
}
