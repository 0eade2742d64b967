//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate
//! login, upload, and post failures. Call counters and recorded posts live
//! behind `Arc`s, so a test can keep a clone of the [`MockConfig`] and inspect
//! it after the platform has been moved into a run.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{BlobRef, VideoPost};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-bluesky")
    pub name: String,

    /// Whether authentication should succeed
    pub auth_succeeds: bool,

    /// Whether blob uploads should succeed
    pub upload_succeeds: bool,

    /// Whether post creation should succeed
    pub post_succeeds: bool,

    /// Error to return on authentication failure
    pub auth_error: Option<String>,

    /// Error to return on upload failure
    pub upload_error: Option<String>,

    /// Error to return on posting failure
    pub post_error: Option<String>,

    /// Number of times authenticate has been called
    pub auth_call_count: Arc<Mutex<usize>>,

    /// Uploads received as (size in bytes, mime type)
    pub uploads: Arc<Mutex<Vec<(usize, String)>>>,

    /// Posts that have been made (for verification)
    pub posts: Arc<Mutex<Vec<VideoPost>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            upload_succeeds: true,
            post_succeeds: true,
            auth_error: None,
            upload_error: None,
            post_error: None,
            auth_call_count: Arc::new(Mutex::new(0)),
            uploads: Arc::new(Mutex::new(Vec::new())),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockConfig {
    /// Get the number of times authenticate was called
    pub fn auth_call_count(&self) -> usize {
        *self.auth_call_count.lock().unwrap()
    }

    /// Get the number of upload attempts
    pub fn upload_call_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Get every upload attempt
    pub fn uploads(&self) -> Vec<(usize, String)> {
        self.uploads.lock().unwrap().clone()
    }

    /// Get all posts that were published
    pub fn posts(&self) -> Vec<VideoPost> {
        self.posts.lock().unwrap().clone()
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
    authenticated: bool,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails authentication
    pub fn auth_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            auth_succeeds: false,
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails the blob upload
    pub fn upload_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            upload_succeeds: false,
            upload_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails post creation
    pub fn post_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_succeeds: false,
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// Shared handle on the counters and recorded posts
    pub fn config(&self) -> MockConfig {
        self.config.clone()
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(PlatformError::Authentication("Not authenticated".to_string()).into())
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn authenticate(&mut self) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            let error_msg = self
                .config
                .auth_error
                .clone()
                .unwrap_or_else(|| "Mock authentication failed".to_string());
            Err(PlatformError::Authentication(error_msg).into())
        }
    }

    async fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<BlobRef> {
        self.ensure_authenticated()?;
        self.config
            .uploads
            .lock()
            .unwrap()
            .push((data.len(), mime_type.to_string()));

        if !self.config.upload_succeeds {
            let error_msg = self
                .config
                .upload_error
                .clone()
                .unwrap_or_else(|| "Mock upload failed".to_string());
            return Err(PlatformError::Posting(error_msg).into());
        }

        Ok(BlobRef(serde_json::json!({
            "$type": "blob",
            "ref": { "$link": format!("mock-blob-{}", data.len()) },
            "mimeType": mime_type,
            "size": data.len(),
        })))
    }

    async fn create_post(&self, post: &VideoPost) -> Result<String> {
        self.ensure_authenticated()?;

        if !self.config.post_succeeds {
            let error_msg = self
                .config
                .post_error
                .clone()
                .unwrap_or_else(|| "Mock posting failed".to_string());
            return Err(PlatformError::Posting(error_msg).into());
        }

        self.config.posts.lock().unwrap().push(post.clone());
        Ok(format!(
            "at://did:plc:mock/app.bsky.feed.post/{}",
            post.id
        ))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VideoId;
    use crate::LoopcastError;

    #[tokio::test]
    async fn test_success_flow_records_calls() {
        let mut platform = MockPlatform::success("mock-bluesky");
        let handle = platform.config();

        platform.authenticate().await.unwrap();
        let blob = platform.upload_blob(vec![1, 2, 3], "video/mp4").await.unwrap();
        let post = VideoPost::new(VideoId::new(3).unwrap(), blob);
        let uri = platform.create_post(&post).await.unwrap();

        assert_eq!(uri, "at://did:plc:mock/app.bsky.feed.post/00003");
        assert_eq!(handle.auth_call_count(), 1);
        assert_eq!(handle.uploads(), vec![(3, "video/mp4".to_string())]);
        assert_eq!(handle.posts(), vec![post]);
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let mut platform = MockPlatform::auth_failure("mock-bluesky", "bad password");

        match platform.authenticate().await {
            Err(LoopcastError::Platform(PlatformError::Authentication(msg))) => {
                assert_eq!(msg, "bad password");
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }
        assert!(!platform.is_authenticated());
    }

    #[tokio::test]
    async fn test_upload_requires_authentication() {
        let platform = MockPlatform::success("mock-bluesky");
        assert!(platform.upload_blob(vec![0], "video/mp4").await.is_err());
        assert_eq!(platform.config().upload_call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_counts_attempt() {
        let mut platform = MockPlatform::upload_failure("mock-bluesky", "blob rejected");
        platform.authenticate().await.unwrap();

        let result = platform.upload_blob(vec![0; 8], "video/mp4").await;
        assert!(result.unwrap_err().to_string().contains("blob rejected"));
        assert_eq!(platform.config().upload_call_count(), 1);
    }

    #[tokio::test]
    async fn test_post_failure_records_no_post() {
        let mut platform = MockPlatform::post_failure("mock-bluesky", "record rejected");
        let handle = platform.config();
        platform.authenticate().await.unwrap();

        let blob = platform.upload_blob(vec![0; 4], "video/mp4").await.unwrap();
        let post = VideoPost::new(VideoId::new(9).unwrap(), blob);
        let err = platform.create_post(&post).await.unwrap_err();

        assert!(err.to_string().contains("record rejected"));
        assert_eq!(handle.upload_call_count(), 1);
        assert!(handle.posts().is_empty());
    }
}
