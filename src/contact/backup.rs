//! Backup store
//!
//! One pretty-printed JSON file per submission, named after the second the
//! submission was stamped: `submission_<YYYYMMDD>_<HHMMSS>.json`.
//!
//! Two submissions stamped within the same second share a file name and the
//! later one replaces the earlier. Nothing here locks the directory.

use chrono::{Local, NaiveDateTime};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::PersistenceError;
use super::submission::{ContactForm, Submission};
use crate::config::BackupConfig;

const FILE_PREFIX: &str = "submission_";
const FILE_EXTENSION: &str = "json";

/// Result of a successful backup write
#[derive(Debug, Clone)]
pub struct SavedSubmission {
    pub submission: Submission,
    pub path: PathBuf,
}

/// File-per-record submission storage
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(config: &BackupConfig) -> Self {
        Self {
            dir: config.dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the backup directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    /// Stamp the form with the current local time and write it out
    pub async fn save(&self, form: &ContactForm) -> Result<SavedSubmission, PersistenceError> {
        self.save_at(form, Local::now().naive_local()).await
    }

    /// Stamp the form with `at` and write it out
    pub async fn save_at(
        &self,
        form: &ContactForm,
        at: NaiveDateTime,
    ) -> Result<SavedSubmission, PersistenceError> {
        self.ensure_dir().await?;

        let submission = Submission::stamp(form.clone(), at);
        let path = self.dir.join(file_name_for(at));
        let json = serde_json::to_vec_pretty(&submission)?;

        fs::write(&path, json)
            .await
            .map_err(|source| PersistenceError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(SavedSubmission { submission, path })
    }

    /// Read back every stored submission, ordered by file name
    ///
    /// A backup directory that does not exist yet holds no submissions.
    pub async fn list(&self) -> Result<Vec<Submission>, PersistenceError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| PersistenceError::Read {
                    path: self.dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut submissions = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)
                .await
                .map_err(|source| PersistenceError::Read {
                    path: path.clone(),
                    source,
                })?;
            let submission = serde_json::from_slice(&bytes)
                .map_err(|source| PersistenceError::Decode { path, source })?;
            submissions.push(submission);
        }
        Ok(submissions)
    }
}

/// Second-resolution file name for a submission stamped at `at`
pub fn file_name_for(at: NaiveDateTime) -> String {
    format!("{FILE_PREFIX}{}.{FILE_EXTENSION}", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn form(name: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
        }
    }

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    fn store(dir: &Path) -> BackupStore {
        BackupStore::new(&BackupConfig {
            dir: dir.to_path_buf(),
        })
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name_for(at(9, 26, 53, 589_793)),
            "submission_20250314_092653.json"
        );
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_stamps() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp.path().join("nested").join("submissions"));

        let saved = store.save_at(&form("Ada"), at(9, 26, 53, 1)).await.unwrap();

        assert_eq!(saved.submission.timestamp, at(9, 26, 53, 1));
        assert_eq!(
            saved.path,
            store.dir().join("submission_20250314_092653.json")
        );

        let raw = std::fs::read_to_string(&saved.path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["name"], "Ada");
        assert_eq!(value["timestamp"], "2025-03-14T09:26:53.000001");
        assert!(raw.contains("\n  \"name\""), "expected 2-space indent: {raw}");
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp.path().join("submissions"));
        store.ensure_dir().await.unwrap();
        store.ensure_dir().await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        store.save_at(&form("Third"), at(12, 0, 0, 0)).await.unwrap();
        store.save_at(&form("First"), at(8, 0, 0, 0)).await.unwrap();
        store.save_at(&form("Second"), at(10, 30, 0, 0)).await.unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_same_second_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        store.save_at(&form("Ada"), at(9, 0, 0, 100)).await.unwrap();
        store.save_at(&form("Grace"), at(9, 0, 0, 900)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp.path().join("never-created"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_fails_on_corrupt_record() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        store.save_at(&form("Ada"), at(9, 0, 0, 0)).await.unwrap();
        std::fs::write(tmp.path().join("submission_20250314_100000.json"), "{oops").unwrap();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Decode { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_unwritable_location_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "a file, not a directory").unwrap();
        let store = store(&blocker.join("submissions"));

        let err = store.save(&form("Ada")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::CreateDir { .. }), "{err}");
    }
}
