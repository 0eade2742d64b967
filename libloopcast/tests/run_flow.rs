//! End-to-end tests for a posting run against the mock platform

use libloopcast::error::PlatformError;
use libloopcast::platforms::mock::MockPlatform;
use libloopcast::{
    Config, LoopcastError, PostedVideos, PublishOutcome, RunContext, RunMode, RunOutcome,
    StateLoad,
};
use tempfile::TempDir;

struct TestEnv {
    work_dir: TempDir,
    video_dir: TempDir,
}

impl TestEnv {
    fn new(files: &[&str]) -> Self {
        let work_dir = TempDir::new().unwrap();
        let video_dir = TempDir::new().unwrap();
        for file in files {
            std::fs::write(video_dir.path().join(file), format!("video {}", file)).unwrap();
        }
        Self {
            work_dir,
            video_dir,
        }
    }

    fn config(&self) -> Config {
        let video_dir = self.video_dir.path().to_string_lossy().into_owned();
        let mut config = Config::from_lookup(|key| match key {
            "BSKY_HANDLE" => Some("loops.bsky.social".to_string()),
            "BSKY_PASSWORD" => Some("app-password".to_string()),
            "VIDEO_DIR" => Some(video_dir.clone()),
            _ => None,
        })
        .unwrap();
        config.state_file = self.work_dir.path().join("posted_videos.json");
        config
    }

    fn context(&self, platform: MockPlatform) -> RunContext {
        RunContext::new(&self.config(), Box::new(platform))
    }

    fn write_state(&self, last_posted: &str, posted: &[&str]) {
        let record = PostedVideos {
            last_posted: last_posted.to_string(),
            posted: posted.iter().map(|s| s.to_string()).collect(),
        };
        std::fs::write(
            self.work_dir.path().join("posted_videos.json"),
            serde_json::to_string_pretty(&record).unwrap(),
        )
        .unwrap();
    }
}

#[tokio::test]
async fn test_run_posts_next_video_and_records_it() {
    let env = TestEnv::new(&["00041_old.mp4", "00042_clip.mp4", "00043_next.mp4"]);
    env.write_state("00041", &["00000", "00040", "00041"]);

    let platform = MockPlatform::success("mock-bluesky");
    let handle = platform.config();
    let mut context = env.context(platform);

    let outcome = context.run(RunMode::Publish).await.unwrap();
    match outcome {
        RunOutcome::Published(PublishOutcome::Posted { id, uri }) => {
            assert_eq!(id.to_string(), "00042");
            assert!(uri.starts_with("at://"));
        }
        other => panic!("Expected a successful publish, got {:?}", other),
    }

    assert_eq!(handle.auth_call_count(), 1);
    let posts = handle.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "loop00042_ #samplethis");

    let saved = context.store().load().await;
    assert_eq!(saved.last_posted, "00042");
    assert_eq!(saved.posted, vec!["00000", "00040", "00041", "00042"]);
}

#[tokio::test]
async fn test_consecutive_runs_walk_the_sequence() {
    let env = TestEnv::new(&["00003_c.mp4", "00001_a.mp4", "00002_b.mp4"]);

    for expected in ["00001", "00002", "00003"] {
        let mut context = env.context(MockPlatform::success("mock-bluesky"));
        let outcome = context.run(RunMode::Publish).await.unwrap();
        assert!(
            matches!(outcome, RunOutcome::Published(ref p) if p.is_success()),
            "run for {} ended with {:?}",
            expected,
            outcome
        );
        assert_eq!(context.store().load().await.last_posted, expected);
    }

    let mut context = env.context(MockPlatform::success("mock-bluesky"));
    assert!(matches!(
        context.run(RunMode::Publish).await.unwrap(),
        RunOutcome::NothingToPost
    ));

    let saved = env.context(MockPlatform::success("unused")).store().load().await;
    assert_eq!(saved.posted, vec!["00000", "00001", "00002", "00003"]);
}

#[tokio::test]
async fn test_login_failure_is_fatal() {
    let env = TestEnv::new(&["00001_a.mp4"]);

    let platform = MockPlatform::auth_failure("mock-bluesky", "Invalid identifier or password");
    let handle = platform.config();
    let mut context = env.context(platform);

    let err = context.run(RunMode::Publish).await.unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(err.exit_code(), 1);
    match err {
        LoopcastError::Platform(PlatformError::Authentication(msg)) => {
            assert_eq!(msg, "Invalid identifier or password");
        }
        other => panic!("Expected authentication error, got {:?}", other),
    }

    assert_eq!(handle.upload_call_count(), 0);
    assert_eq!(context.store().load_outcome().await, StateLoad::Absent);
}

#[tokio::test]
async fn test_nothing_to_post_still_logs_in() {
    let env = TestEnv::new(&["00007_far_ahead.mp4"]);

    let platform = MockPlatform::success("mock-bluesky");
    let handle = platform.config();
    let mut context = env.context(platform);

    let outcome = context.run(RunMode::Publish).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NothingToPost));
    assert_eq!(handle.auth_call_count(), 1);
    assert_eq!(handle.upload_call_count(), 0);
}

#[tokio::test]
async fn test_upload_failure_is_reported_not_fatal() {
    let env = TestEnv::new(&["00001_a.mp4"]);
    env.write_state("00000", &["00000"]);
    let before = std::fs::read_to_string(env.work_dir.path().join("posted_videos.json")).unwrap();

    let mut context = env.context(MockPlatform::upload_failure("mock-bluesky", "503 Service Unavailable"));
    let outcome = context.run(RunMode::Publish).await.unwrap();

    match &outcome {
        RunOutcome::Published(PublishOutcome::Failed { error }) => {
            assert!(error.to_string().contains("503"));
        }
        other => panic!("Expected a failed publish, got {:?}", other),
    }

    let after = std::fs::read_to_string(env.work_dir.path().join("posted_videos.json")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_dry_run_skips_login_and_publishing() {
    let env = TestEnv::new(&["00001_a.mp4"]);

    let platform = MockPlatform::success("mock-bluesky");
    let handle = platform.config();
    let mut context = env.context(platform);

    match context.run(RunMode::DryRun).await.unwrap() {
        RunOutcome::WouldPost(path) => {
            assert_eq!(path, env.video_dir.path().join("00001_a.mp4"));
        }
        other => panic!("Expected WouldPost, got {:?}", other),
    }

    assert_eq!(handle.auth_call_count(), 0);
    assert_eq!(handle.upload_call_count(), 0);
    assert_eq!(context.store().load_outcome().await, StateLoad::Absent);
}

#[tokio::test]
async fn test_unreadable_video_dir_is_nothing_to_post() {
    let env = TestEnv::new(&[]);
    let mut config = env.config();
    config.video_dir = env.video_dir.path().join("missing");

    let mut context = RunContext::new(&config, Box::new(MockPlatform::success("mock-bluesky")));
    assert!(matches!(
        context.run(RunMode::Publish).await.unwrap(),
        RunOutcome::NothingToPost
    ));
}

#[tokio::test]
async fn test_invalid_last_posted_posts_nothing() {
    let env = TestEnv::new(&["00001_a.mp4"]);
    env.write_state("loop", &["00000"]);
    let before = std::fs::read_to_string(env.work_dir.path().join("posted_videos.json")).unwrap();

    let platform = MockPlatform::success("mock-bluesky");
    let handle = platform.config();
    let mut context = env.context(platform);

    let outcome = context.run(RunMode::Publish).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NothingToPost));
    assert_eq!(handle.auth_call_count(), 1);
    assert_eq!(handle.upload_call_count(), 0);
    assert!(handle.posts().is_empty());

    let after = std::fs::read_to_string(env.work_dir.path().join("posted_videos.json")).unwrap();
    assert_eq!(before, after);
}
