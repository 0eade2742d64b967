//! Next-video lookup
//!
//! The next video is the first directory entry whose name starts with the
//! identifier following `lastPosted`. Entries are taken in the order the
//! operating system lists them; nothing is sorted.

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::error::{LoopcastError, Result, StateError};
use crate::state::{PostedVideos, StateStore};
use crate::types::VideoId;

/// Why a lookup produced no file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Matching file for the next identifier
    Found { id: VideoId, path: PathBuf },
    /// No entry starts with the next identifier
    Missing { id: VideoId },
    /// `lastPosted` is already at the cap
    Exhausted,
}

/// Identifier that should be posted after the one recorded in `record`
///
/// Returns `Ok(None)` once the sequence has reached `99999`.
pub fn next_video_id(record: &PostedVideos) -> std::result::Result<Option<VideoId>, StateError> {
    let last = VideoId::parse(&record.last_posted)?;
    Ok(last.successor())
}

/// Scan `dir` for the first entry whose name starts with `id`
pub async fn scan_for(dir: &Path, id: VideoId) -> Result<Option<PathBuf>> {
    let prefix = id.to_string();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(StateError::Io)?;

    while let Some(entry) = entries.next_entry().await.map_err(StateError::Io)? {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(&prefix) {
            return Ok(Some(dir.join(name)));
        }
    }

    Ok(None)
}

/// Load state and look for the next video in `dir`
pub async fn locate_next(store: &StateStore, dir: &Path) -> Result<Located> {
    let record = store.load().await;
    let Some(id) = next_video_id(&record)? else {
        return Ok(Located::Exhausted);
    };
    debug!("Looking for video {} in {}", id, dir.display());

    Ok(match scan_for(dir, id).await? {
        Some(path) => Located::Found { id, path },
        None => Located::Missing { id },
    })
}

/// Path of the next video to post, if any
///
/// Every failure (unreadable directory, bad `lastPosted`, exhausted
/// sequence) is logged and reported the same way as "nothing to post".
pub async fn find_next_video(store: &StateStore, dir: &Path) -> Option<PathBuf> {
    match locate_next(store, dir).await {
        Ok(Located::Found { path, .. }) => Some(path),
        Ok(Located::Missing { id }) => {
            debug!("No file starting with {} in {}", id, dir.display());
            None
        }
        Ok(Located::Exhausted) => {
            warn!(
                "Video sequence exhausted: {} is the last identifier that fits five digits",
                VideoId::MAX
            );
            None
        }
        Err(LoopcastError::State(StateError::InvalidId(value))) => {
            error!(
                "Invalid lastPosted in tracking file {}: '{}'",
                store.path().display(),
                value
            );
            None
        }
        Err(e) => {
            error!("Error reading video directory {}: {}", dir.display(), e);
            None
        }
    }
}
