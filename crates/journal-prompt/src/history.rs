//! Append-only question history.
//!
//! The history file holds one JSON object per line:
//!
//! ```text
//! {"date_utc":"2026-02-13T06:00:00Z","question":"..."}
//! ```
//!
//! Lines are only ever appended. A missing file is an empty history; the
//! first [`HistoryStore::load`] creates it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Timestamp format of [`HistoryRecord::date_utc`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One delivered (or at least generated) question.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_utc: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,
}

/// Missing and `null` fields both read as `""`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl HistoryRecord {
    pub fn new(date_utc: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            date_utc: date_utc.into(),
            question: question.into(),
        }
    }

    /// Record stamped with `now` in [`TIMESTAMP_FORMAT`].
    pub fn stamped(now: DateTime<Utc>, question: impl Into<String>) -> Self {
        Self::new(now.format(TIMESTAMP_FORMAT).to_string(), question)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("{}:{line}: malformed record: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to append to {}: {source}", .path.display())]
    Append { path: PathBuf, source: io::Error },
}

/// JSONL-backed history at a fixed path.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in append order.
    ///
    /// Creates an empty file (and its parent directories) when none exists.
    /// Blank lines are skipped; any other line that is not a JSON record
    /// fails the whole load.
    pub fn load(&self) -> Result<Vec<HistoryRecord>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.create_empty()?;
                debug!("Created empty history at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record =
                serde_json::from_str(line).map_err(|source| StorageError::Parse {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Append one record as a single line. Existing lines are never touched.
    pub fn append(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        self.ensure_parent()?;

        let mut line = serde_json::to_string(record).map_err(StorageError::Encode)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.append_error(source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| self.append_error(source))?;
        file.sync_data()
            .map_err(|source| self.append_error(source))?;

        debug!("Appended {} bytes to {}", line.len(), self.path.display());
        Ok(())
    }

    fn create_empty(&self) -> Result<(), StorageError> {
        self.ensure_parent()?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(|_| ())
            .map_err(|source| StorageError::Create {
                path: self.path.clone(),
                source,
            })
    }

    fn ensure_parent(&self) -> Result<(), StorageError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|source| StorageError::Create {
                    path: parent.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }

    fn append_error(&self, source: io::Error) -> StorageError {
        StorageError::Append {
            path: self.path.clone(),
            source,
        }
    }
}

/// The last `n` records, most recent last. Empty when `n <= 0`.
pub fn tail(history: &[HistoryRecord], n: i64) -> &[HistoryRecord] {
    if n <= 0 {
        return &[];
    }
    let n = usize::try_from(n).unwrap_or(usize::MAX).min(history.len());
    &history[history.len() - n..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn records(count: usize) -> Vec<HistoryRecord> {
        (0..count)
            .map(|i| HistoryRecord::new(format!("2026-01-{:02}T06:00:00Z", i + 1), format!("Q{i}?")))
            .collect()
    }

    #[test]
    fn load_missing_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("journal_questions.jsonl");
        let store = HistoryStore::new(&path);

        assert!(store.load().unwrap().is_empty());
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        // Second load sees the empty file, not an error.
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.jsonl"));

        store.append(&HistoryRecord::new("a", "First?")).unwrap();
        store.append(&HistoryRecord::new("b", "Second?")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded,
            vec![
                HistoryRecord::new("a", "First?"),
                HistoryRecord::new("b", "Second?"),
            ]
        );
    }

    #[test]
    fn append_does_not_rewrite_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let existing = "{\"date_utc\": \"x\", \"question\": \"Kept verbatim?\"}\n";
        fs::write(&path, existing).unwrap();

        HistoryStore::new(&path)
            .append(&HistoryRecord::new("y", "New?"))
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(existing));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn multiline_question_stays_on_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("h.jsonl"));
        let block = "Šta?\nNe?\nQuoi?\nЧто?\nWhat?";

        store.append(&HistoryRecord::new("d", block)).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("Что?"), "non-ASCII is written unescaped");
        assert_eq!(store.load().unwrap()[0].question, block);
    }

    #[test]
    fn load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(
            &path,
            "\n{\"date_utc\":\"a\",\"question\":\"One?\"}\n   \n{\"date_utc\":\"b\",\"question\":\"Two?\"}\n",
        )
        .unwrap();

        let loaded = HistoryStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].question, "Two?");
    }

    #[test]
    fn load_reports_malformed_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(&path, "{\"date_utc\":\"a\",\"question\":\"One?\"}\nnot json\n").unwrap();

        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Parse { line: 2, .. }));
        assert!(err.to_string().contains(":2: malformed record"));
    }

    #[test]
    fn missing_fields_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(&path, "{\"question\":\"Undated?\"}\n").unwrap();

        let loaded = HistoryStore::new(&path).load().unwrap();
        assert_eq!(loaded[0].date_utc, "");
        assert_eq!(loaded[0].question, "Undated?");
    }

    #[test]
    fn null_fields_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(
            &path,
            "{\"date_utc\": null, \"question\": \"Q?\"}\n{\"date_utc\": \"b\", \"question\": null}\n",
        )
        .unwrap();

        let loaded = HistoryStore::new(&path).load().unwrap();
        assert_eq!(
            loaded,
            vec![HistoryRecord::new("", "Q?"), HistoryRecord::new("b", "")]
        );
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        fs::write(&path, "{\"date_utc\": 7, \"question\": \"Q?\"}\n").unwrap();

        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::Parse { line: 1, .. }));
    }

    #[test]
    fn stamped_uses_utc_seconds_format() {
        let now = Utc.with_ymd_and_hms(2026, 2, 13, 6, 5, 9).unwrap();
        assert_eq!(
            HistoryRecord::stamped(now, "Q?").date_utc,
            "2026-02-13T06:05:09Z"
        );
    }

    #[test]
    fn tail_returns_last_n_in_order() {
        let history = records(5);
        assert_eq!(tail(&history, 2), &history[3..]);
        assert_eq!(tail(&history, 5), &history[..]);
        assert_eq!(tail(&history, 120), &history[..]);
    }

    #[test]
    fn tail_non_positive_is_empty() {
        let history = records(3);
        assert!(tail(&history, 0).is_empty());
        assert!(tail(&history, -4).is_empty());
        assert!(tail(&[], 10).is_empty());
    }

    #[test]
    fn tail_length_is_min_of_n_and_len() {
        let history = records(7);
        for n in 0..12i64 {
            let got = tail(&history, n);
            assert_eq!(got.len(), (n as usize).min(history.len()));
            assert_eq!(got, &history[history.len() - got.len()..]);
        }
    }
}
