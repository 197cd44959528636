//! Flat JSON record store.
//!
//! The whole collection is read once at run start and written once at run
//! end as a pretty-printed JSON array. Writes go through a sibling temp file
//! and a rename, so readers never see a half-written store.
//!
//! There is no locking: concurrent runs must be serialized by the scheduler.

use std::path::{Path, PathBuf};

use chrono::Utc;
use regwatch_shared::{RegulationRecord, RegwatchError, Result};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

/// Result of [`RecordStore::load`].
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<RegulationRecord>,
    /// Array elements that could not be read as records and were dropped.
    pub skipped: usize,
    /// Where the original store was preserved: moved aside when the file is
    /// not a JSON array, copied aside when individual records were skipped.
    pub quarantined: Option<PathBuf>,
}

/// Handle to the JSON file holding every tracked record.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. A missing file is an empty collection.
    ///
    /// A file that is not a JSON array is moved aside and yields an empty
    /// collection. Inside a readable array, each record is decoded on its own:
    /// unreadable ones are logged and dropped, and a copy of the original file
    /// is kept so the next save loses nothing.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<LoadedRecords> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("store not found, starting empty");
                return Ok(LoadedRecords::default());
            }
            Err(e) => return Err(RegwatchError::io(&self.path, e)),
        };

        let values = match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(values) => values,
            Err(parse_err) => {
                let backup = self.quarantine_path();
                tokio::fs::rename(&self.path, &backup)
                    .await
                    .map_err(|e| RegwatchError::io(&self.path, e))?;
                error!(
                    error = %parse_err,
                    backup = %backup.display(),
                    "store is corrupt, moved aside and starting empty"
                );
                return Ok(LoadedRecords {
                    quarantined: Some(backup),
                    ..LoadedRecords::default()
                });
            }
        };

        let mut records = Vec::with_capacity(values.len());
        let mut skipped = 0;
        for (index, value) in values.into_iter().enumerate() {
            let title = value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match serde_json::from_value::<RegulationRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(index, title = %title, error = %e, "skipping unreadable record");
                    skipped += 1;
                }
            }
        }

        let quarantined = if skipped > 0 {
            let backup = self.quarantine_path();
            tokio::fs::copy(&self.path, &backup)
                .await
                .map_err(|e| RegwatchError::io(&backup, e))?;
            warn!(
                skipped,
                backup = %backup.display(),
                "store had unreadable records, original copied aside"
            );
            Some(backup)
        } else {
            None
        };

        info!(records = records.len(), skipped, "store loaded");
        Ok(LoadedRecords {
            records,
            skipped,
            quarantined,
        })
    }

    /// Persist the full collection (2-space indent, UTF-8, non-ASCII kept).
    #[instrument(skip_all, fields(path = %self.path.display(), records = records.len()))]
    pub async fn save(&self, records: &[RegulationRecord]) -> Result<()> {
        let mut json = serde_json::to_string_pretty(records)
            .map_err(|e| RegwatchError::Storage(format!("failed to serialize records: {e}")))?;
        json.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RegwatchError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| RegwatchError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RegwatchError::io(&self.path, e))?;

        info!("store saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_file_name(format!(".{}.tmp", self.file_name()))
    }

    fn quarantine_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        self.path
            .with_file_name(format!("{}.corrupt-{stamp}", self.file_name()))
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "regulations.json".into())
    }
}
