//! Video publishing
//!
//! Publishing one video is: read the file, upload it as a `video/mp4` blob,
//! create the `loop<id>_ #samplethis` post embedding that blob, then record
//! the identifier in the tracking file. Any failure ends the attempt; nothing
//! already sent to the remote service is rolled back.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{LoopcastError, Result};
use crate::platforms::Platform;
use crate::state::StateStore;
use crate::types::{VideoId, VideoPost, VIDEO_MIME_TYPE};

/// Result of one publish attempt
#[derive(Debug)]
pub enum PublishOutcome {
    /// Post created and tracking file updated
    Posted { id: VideoId, uri: String },
    /// Post created, but the tracking file could not be updated
    ///
    /// The next run will post the same video again unless `id` is appended
    /// to the tracking file by hand.
    PostedUnrecorded {
        id: VideoId,
        uri: String,
        error: LoopcastError,
    },
    /// Nothing was posted
    Failed { error: LoopcastError },
}

impl PublishOutcome {
    /// True only when both the post and the tracking update succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Posted { .. })
    }

    /// Whether the remote post exists, regardless of the tracking update
    pub fn was_posted(&self) -> bool {
        !matches!(self, PublishOutcome::Failed { .. })
    }
}

/// Identifier of the video at `path`, taken from its base name
pub fn video_id_for(path: &Path) -> Result<VideoId> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    VideoId::from_file_name(&name).ok_or_else(|| {
        LoopcastError::InvalidInput(format!(
            "Video file name '{}' does not start with a 5-digit sequence number",
            name
        ))
    })
}

/// Upload the file and create the post, returning its identifier and URI
async fn post_video(platform: &dyn Platform, path: &Path) -> Result<(VideoId, String)> {
    let id = video_id_for(path)?;

    let data = tokio::fs::read(path).await?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let blob = platform.upload_blob(data, VIDEO_MIME_TYPE).await?;
    debug!("Uploaded video {} to {}", id, platform.name());

    let post = VideoPost::new(id, blob);
    let uri = platform.create_post(&post).await?;
    info!("Created post {} for video {}", uri, id);

    Ok((id, uri))
}

/// Publish the video at `path` and record it in `store`
pub async fn publish_video(
    platform: &dyn Platform,
    store: &StateStore,
    path: &Path,
) -> PublishOutcome {
    let (id, uri) = match post_video(platform, path).await {
        Ok(posted) => posted,
        Err(error) => return PublishOutcome::Failed { error },
    };

    match store.record_posted(id).await {
        Ok(_) => PublishOutcome::Posted { id, uri },
        Err(error) => PublishOutcome::PostedUnrecorded { id, uri, error },
    }
}
