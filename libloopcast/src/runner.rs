//! Run orchestration
//!
//! A run walks `LoggingIn -> Locating -> Publishing -> Done`. Login failure
//! is the only error that escapes; a missing video ends the run early and a
//! failed publish is logged and reported as an outcome.

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::locator::find_next_video;
use crate::platforms::bluesky::BlueskyClient;
use crate::platforms::Platform;
use crate::publisher::{publish_video, PublishOutcome};
use crate::state::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Log in, post the next video, update the tracking file
    Publish,
    /// Only report which video would be posted
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoggingIn,
    Locating,
    Publishing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::LoggingIn => write!(f, "logging-in"),
            Stage::Locating => write!(f, "locating"),
            Stage::Publishing => write!(f, "publishing"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// No file matches the next identifier
    NothingToPost,
    /// Dry run found this file
    WouldPost(PathBuf),
    /// A publish was attempted
    Published(PublishOutcome),
}

/// Everything a run needs, built once at startup
pub struct RunContext {
    video_dir: PathBuf,
    store: StateStore,
    platform: Box<dyn Platform>,
}

impl RunContext {
    pub fn new(config: &Config, platform: Box<dyn Platform>) -> Self {
        Self {
            video_dir: config.video_dir.clone(),
            store: StateStore::new(config.state_file.clone()),
            platform,
        }
    }

    /// Build a context talking to the configured Bluesky service
    pub fn from_config(config: &Config) -> Result<Self> {
        let platform = BlueskyClient::from_config(config)?;
        Ok(Self::new(config, Box::new(platform)))
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    fn enter(&self, stage: Stage) {
        debug!(stage = %stage, "Entering stage");
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Returns the login error when authentication fails. Nothing else is
    /// fatal.
    pub async fn run(&mut self, mode: RunMode) -> Result<RunOutcome> {
        if mode == RunMode::Publish {
            self.enter(Stage::LoggingIn);
            self.platform.authenticate().await?;
            info!("Logged in to {}", self.platform.name());
        }
        info!("Video directory configured as: {}", self.video_dir.display());

        self.enter(Stage::Locating);
        let Some(path) = find_next_video(&self.store, &self.video_dir).await else {
            info!("No new videos found to post");
            self.enter(Stage::Done);
            return Ok(RunOutcome::NothingToPost);
        };

        if mode == RunMode::DryRun {
            info!("Next video to post: {}", path.display());
            self.enter(Stage::Done);
            return Ok(RunOutcome::WouldPost(path));
        }

        self.enter(Stage::Publishing);
        info!("Attempting to post video: {}", path.display());
        let outcome = publish_video(self.platform.as_ref(), &self.store, &path).await;

        match &outcome {
            PublishOutcome::Posted { id, uri } => {
                info!("Posted video {} as {}", id, uri);
            }
            PublishOutcome::PostedUnrecorded { id, uri, error } => {
                error!(
                    "Posted video {} as {} but could not update {}: {}",
                    id,
                    uri,
                    self.store.path().display(),
                    error
                );
                warn!(
                    "Append \"{}\" to the tracking file and set lastPosted to it, or the next run will post it again",
                    id
                );
            }
            PublishOutcome::Failed { error } => {
                error!("Failed to post video {}: {}", path.display(), error);
            }
        }

        self.enter(Stage::Done);
        Ok(RunOutcome::Published(outcome))
    }
}
