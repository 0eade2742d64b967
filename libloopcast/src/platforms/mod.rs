//! Platform abstraction and implementations
//!
//! A platform knows how to log in, store a binary blob, and publish a video
//! post that embeds that blob. The run orchestration only talks to the
//! [`Platform`] trait, so tests can swap in [`mock::MockPlatform`].
//!
//! # Examples
//!
//! ```no_run
//! use libloopcast::platforms::{Platform, bluesky::BlueskyClient};
//! use libloopcast::types::{VideoId, VideoPost, VIDEO_MIME_TYPE};
//!
//! # async fn example() -> libloopcast::error::Result<()> {
//! let mut platform = BlueskyClient::new(
//!     "https://bsky.social",
//!     "loops.bsky.social".to_string(),
//!     "app-password".to_string(),
//! )?;
//! platform.authenticate().await?;
//!
//! let bytes = tokio::fs::read("videos/00001_intro.mp4").await.unwrap();
//! let blob = platform.upload_blob(bytes, VIDEO_MIME_TYPE).await?;
//! let post = VideoPost::new(VideoId::new(1).unwrap(), blob);
//! let uri = platform.create_post(&post).await?;
//! println!("Posted: {}", uri);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BlobRef, VideoPost};

pub mod bluesky;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Platform trait for the remote social network
#[async_trait]
pub trait Platform: Send + Sync {
    /// Authenticate with the platform
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the credentials are rejected,
    /// or `PlatformError::Network` if the service cannot be reached.
    async fn authenticate(&mut self) -> Result<()>;

    /// Upload raw bytes and return the platform's reference to them
    ///
    /// # Arguments
    ///
    /// * `data` - The full file content
    /// * `mime_type` - Content type sent with the upload
    async fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<BlobRef>;

    /// Publish a post embedding a previously uploaded blob
    ///
    /// Returns the platform-specific post identifier (an AT URI for Bluesky).
    async fn create_post(&self, post: &VideoPost) -> Result<String>;

    /// Lowercase platform identifier, e.g. "bluesky"
    fn name(&self) -> &str;

    /// Whether `authenticate` has succeeded
    fn is_authenticated(&self) -> bool;
}
