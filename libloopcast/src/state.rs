//! Tracking file for posted videos
//!
//! The tracking file is a small JSON document:
//!
//! ```json
//! {
//!   "lastPosted": "00042",
//!   "posted": ["00000", "00001", "00042"]
//! }
//! ```
//!
//! It is rewritten in full on every save. There is no locking and no atomic
//! rename, so only one run may touch a given file at a time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, StateError};
use crate::types::VideoId;

/// Persisted record of posted video identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedVideos {
    pub last_posted: String,
    pub posted: Vec<String>,
}

impl Default for PostedVideos {
    fn default() -> Self {
        let sentinel = VideoId::SENTINEL.to_string();
        Self {
            last_posted: sentinel.clone(),
            posted: vec![sentinel],
        }
    }
}

impl PostedVideos {
    /// Mark `id` as the most recent post, appending it to the history
    pub fn record(&mut self, id: VideoId) {
        let id = id.to_string();
        self.last_posted = id.clone();
        self.posted.push(id);
    }
}

/// Result of reading the tracking file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLoad {
    /// File read and parsed
    Loaded(PostedVideos),
    /// No tracking file yet
    Absent,
    /// File exists but could not be read or parsed
    Corrupt(String),
}

impl StateLoad {
    /// Collapse to a record, substituting the default for `Absent`/`Corrupt`
    pub fn into_record(self) -> PostedVideos {
        match self {
            StateLoad::Loaded(record) => record,
            StateLoad::Absent | StateLoad::Corrupt(_) => PostedVideos::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the tracking file, reporting why a default would be needed
    pub async fn load_outcome(&self) -> StateLoad {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StateLoad::Absent,
            Err(e) => return StateLoad::Corrupt(format!("read failed: {}", e)),
        };

        match serde_json::from_str::<PostedVideos>(&data) {
            Ok(record) => StateLoad::Loaded(record),
            Err(e) => StateLoad::Corrupt(format!("parse failed: {}", e)),
        }
    }

    /// Read the tracking file, falling back to the default record
    pub async fn load(&self) -> PostedVideos {
        match self.load_outcome().await {
            StateLoad::Loaded(record) => record,
            StateLoad::Absent => {
                debug!("No tracking file at {}, starting fresh", self.path.display());
                PostedVideos::default()
            }
            StateLoad::Corrupt(reason) => {
                warn!(
                    "Ignoring unreadable tracking file {}: {}",
                    self.path.display(),
                    reason
                );
                PostedVideos::default()
            }
        }
    }

    /// Overwrite the tracking file with `record`
    pub async fn save(&self, record: &PostedVideos) -> Result<()> {
        let json = serde_json::to_string_pretty(record).map_err(StateError::Serialize)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(StateError::Io)?;
        debug!("Saved tracking file {}", self.path.display());
        Ok(())
    }

    /// Reload, append `id`, and save
    pub async fn record_posted(&self, id: VideoId) -> Result<PostedVideos> {
        let mut record = self.load().await;
        record.record(id);
        self.save(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("posted_videos.json"))
    }

    #[test]
    fn test_default_record() {
        let record = PostedVideos::default();
        assert_eq!(record.last_posted, "00000");
        assert_eq!(record.posted, vec!["00000".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.load_outcome().await, StateLoad::Absent);
        assert_eq!(store.load().await, PostedVideos::default());
    }

    #[tokio::test]
    async fn test_malformed_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), "{ not json").await.unwrap();

        match store.load_outcome().await {
            StateLoad::Corrupt(reason) => assert!(reason.contains("parse failed")),
            other => panic!("Expected Corrupt, got {:?}", other),
        }
        assert_eq!(store.load().await, PostedVideos::default());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), r#"{"last": "00001"}"#)
            .await
            .unwrap();

        assert!(matches!(store.load_outcome().await, StateLoad::Corrupt(_)));
        assert_eq!(store.load().await, PostedVideos::default());
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = PostedVideos {
            last_posted: "00001".to_string(),
            posted: vec!["00000".to_string(), "00001".to_string()],
        };

        store.save(&record).await.unwrap();

        let written = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(
            written,
            "{\n  \"lastPosted\": \"00001\",\n  \"posted\": [\n    \"00000\",\n    \"00001\"\n  ]\n}"
        );
        assert_eq!(store.load_outcome().await, StateLoad::Loaded(record));
    }

    #[tokio::test]
    async fn test_record_posted_appends_and_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&PostedVideos {
                last_posted: "00041".to_string(),
                posted: vec![
                    "00000".to_string(),
                    "00040".to_string(),
                    "00041".to_string(),
                ],
            })
            .await
            .unwrap();

        let updated = store
            .record_posted(VideoId::new(42).unwrap())
            .await
            .unwrap();

        assert_eq!(updated.last_posted, "00042");
        assert_eq!(updated.posted, vec!["00000", "00040", "00041", "00042"]);
        assert_eq!(store.load().await, updated);
    }

    #[tokio::test]
    async fn test_record_posted_starts_from_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let updated = store.record_posted(VideoId::new(1).unwrap()).await.unwrap();

        assert_eq!(updated.last_posted, "00001");
        assert_eq!(updated.posted, vec!["00000", "00001"]);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("missing").join("posted_videos.json"));

        let result = store.save(&PostedVideos::default()).await;
        assert!(matches!(
            result,
            Err(crate::LoopcastError::State(StateError::Io(_)))
        ));
    }
}
