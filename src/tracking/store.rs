//! Per-project duration persistence
//!
//! The store file is a pretty-printed JSON array:
//!
//! ```json
//! [
//!     { "projectName": "my-app", "totalTimeSpent": 3725 }
//! ]
//! ```
//!
//! Every update rewrites the whole file through a temp file + rename, so a
//! reader never sees a partially written array.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{TrackerError, TrackerResult};

/// Cumulative tracked time for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(rename = "projectName")]
    pub project_id: String,
    #[serde(rename = "totalTimeSpent")]
    pub total_seconds: u64,
}

impl ProjectRecord {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            total_seconds: 0,
        }
    }
}

/// In-memory record set backed by a JSON file
#[derive(Debug)]
pub struct DurationStore {
    records: Vec<ProjectRecord>,
    path: Option<PathBuf>,
}

impl DurationStore {
    /// A store that never touches the filesystem. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            path: None,
        }
    }

    /// Load the record set from `path`.
    ///
    /// A missing file is created empty. Unreadable or malformed content is
    /// logged and replaced by an empty set; losing the totals is preferred
    /// over refusing to start.
    pub fn load(path: &Path) -> Self {
        let records = match Self::read_records(path) {
            Ok(records) => records,
            Err(e) => {
                warn!("{}, starting with no recorded projects", e);
                Vec::new()
            }
        };

        let store = Self {
            records,
            path: Some(path.to_path_buf()),
        };

        if !path.exists() {
            if let Err(e) = store.persist() {
                warn!("Could not create store file: {}", e);
            }
        }

        info!("Loaded {} project records from {}", store.records.len(), path.display());
        store
    }

    fn read_records(path: &Path) -> TrackerResult<Vec<ProjectRecord>> {
        let read_error = |details: String| TrackerError::PersistenceRead {
            path: path.to_path_buf(),
            details,
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_error(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut records: Vec<ProjectRecord> =
            serde_json::from_str(&content).map_err(|e| read_error(e.to_string()))?;

        // Older files may carry duplicates; keep the first entry per project.
        let mut seen = std::collections::HashSet::new();
        records.retain(|r| seen.insert(r.project_id.clone()));

        Ok(records)
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn get(&self, project_id: &str) -> Option<&ProjectRecord> {
        self.records.iter().find(|r| r.project_id == project_id)
    }

    pub fn total_for(&self, project_id: &str) -> Option<u64> {
        self.get(project_id).map(|r| r.total_seconds)
    }

    /// Insert a zeroed record unless one already exists. Returns the current total.
    pub fn ensure(&mut self, project_id: &str) -> u64 {
        if let Some(total) = self.total_for(project_id) {
            return total;
        }
        debug!("Creating record for project {}", project_id);
        self.records.push(ProjectRecord::new(project_id));
        0
    }

    /// Set the total for a project and write the full record set to disk
    /// before returning.
    ///
    /// The in-memory value is updated even when the write fails, so the next
    /// successful persist carries it.
    pub fn upsert_and_persist(&mut self, project_id: &str, total_seconds: u64) -> TrackerResult<()> {
        self.set_total(project_id, total_seconds);
        self.persist()
    }

    fn set_total(&mut self, project_id: &str, total_seconds: u64) {
        match self.records.iter_mut().find(|r| r.project_id == project_id) {
            Some(record) => record.total_seconds = total_seconds,
            None => self.records.push(ProjectRecord {
                project_id: project_id.to_string(),
                total_seconds,
            }),
        }
    }

    /// Rewrite the store file with the current record set.
    pub fn persist(&self) -> TrackerResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        write_records(path, &self.records).map_err(|source| TrackerError::PersistenceWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Persisted {} project records", self.records.len());
        Ok(())
    }

    /// Move a store file from its legacy location to `new`.
    ///
    /// Does nothing unless `old` exists and `new` does not, so it is safe to
    /// call on every startup. Returns whether a file was moved.
    pub fn migrate(old: &Path, new: &Path) -> io::Result<bool> {
        if new.exists() || !old.exists() {
            return Ok(false);
        }

        if let Some(parent) = new.parent() {
            fs::create_dir_all(parent)?;
        }

        // rename fails across filesystems; fall back to copy + remove
        if fs::rename(old, new).is_err() {
            fs::copy(old, new)?;
            if let Err(e) = fs::remove_file(old) {
                warn!("Copied legacy store but could not remove {}: {}", old.display(), e);
            }
        }

        info!("Migrated store file from {} to {}", old.display(), new.display());
        Ok(true)
    }
}

fn write_records(path: &Path, records: &[ProjectRecord]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser).map_err(io::Error::from)?;

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(&buf)?;
    temp_file.flush()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_creates_missing_file_as_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");

        let store = DurationStore::load(&path);
        assert!(store.records().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn load_falls_back_to_empty_on_corrupt_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(&path, "{ not json").unwrap();

        let store = DurationStore::load(&path);
        assert!(store.records().is_empty());
    }

    #[test]
    fn persisted_file_uses_camel_case_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");

        let mut store = DurationStore::load(&path);
        store.upsert_and_persist("alpha", 42).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"projectName\": \"alpha\""));
        assert!(raw.contains("\"totalTimeSpent\": 42"));
        assert!(raw.contains("\n        \"projectName\""), "expected 4-space indent: {raw}");
    }

    #[test]
    fn reload_yields_same_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");

        let mut store = DurationStore::load(&path);
        store.upsert_and_persist("alpha", 10).unwrap();
        store.upsert_and_persist("beta", 7).unwrap();
        store.upsert_and_persist("alpha", 15).unwrap();

        let reloaded = DurationStore::load(&path);
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(reloaded.total_for("alpha"), Some(15));
        assert_eq!(reloaded.records().len(), 2);
    }

    #[test]
    fn duplicate_entries_collapse_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(
            &path,
            r#"[{"projectName":"a","totalTimeSpent":1},{"projectName":"a","totalTimeSpent":9}]"#,
        )
        .unwrap();

        let store = DurationStore::load(&path);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.total_for("a"), Some(1));
    }

    #[test]
    fn write_failure_keeps_in_memory_total() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("projects.json");
        fs::create_dir(&path).unwrap();

        let mut store = DurationStore {
            records: Vec::new(),
            path: Some(path),
        };
        let err = store.upsert_and_persist("alpha", 30).unwrap_err();
        assert!(matches!(err, TrackerError::PersistenceWrite { .. }));
        assert_eq!(store.total_for("alpha"), Some(30));
    }

    #[test]
    fn migrate_moves_legacy_file_once() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("legacy").join("projects.json");
        let new = dir.path().join("data").join("projects.json");
        fs::create_dir_all(old.parent().unwrap()).unwrap();
        fs::write(&old, r#"[{"projectName":"a","totalTimeSpent":5}]"#).unwrap();

        assert!(DurationStore::migrate(&old, &new).unwrap());
        assert!(!old.exists());
        assert_eq!(DurationStore::load(&new).total_for("a"), Some(5));

        // second call is a no-op
        assert!(!DurationStore::migrate(&old, &new).unwrap());
    }

    #[test]
    fn migrate_leaves_existing_target_alone() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old.json");
        let new = dir.path().join("new.json");
        fs::write(&old, r#"[{"projectName":"old","totalTimeSpent":1}]"#).unwrap();
        fs::write(&new, r#"[{"projectName":"new","totalTimeSpent":2}]"#).unwrap();

        assert!(!DurationStore::migrate(&old, &new).unwrap());
        assert!(old.exists());
        assert_eq!(DurationStore::load(&new).total_for("new"), Some(2));
    }
}
