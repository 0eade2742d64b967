//! loop-post - Post the next numbered video from a directory to Bluesky

use clap::Parser;
use libloopcast::logging::{LogFormat, LoggingConfig};
use libloopcast::{Config, Result, RunContext, RunMode, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "loop-post")]
#[command(version)]
#[command(about = "Post the next numbered video from a directory to Bluesky")]
#[command(long_about = "\
loop-post - Post the next numbered video from a directory to Bluesky

DESCRIPTION:
    Each run posts one video. Files in VIDEO_DIR are named with a 5-digit
    sequence number prefix (00001_intro.mp4, 00002_loop.mp4, ...). The last
    posted number is kept in posted_videos.json in the working directory, and
    the next run picks the file numbered one higher.

    Intended to be run from cron, one instance at a time.

CONFIGURATION:
    BSKY_HANDLE     Account handle (required)
    BSKY_PASSWORD   App password (required)
    VIDEO_DIR       Directory holding the numbered videos (required)
    BSKY_SERVICE    XRPC service URL (default: https://bsky.social)

    Variables may also be placed in a .env file.

EXIT CODES:
    0 - Posted, nothing to post, or the post attempt failed (see logs)
    1 - Missing configuration or login failure
")]
struct Cli {
    /// Show the next video without logging in or posting
    #[arg(long)]
    dry_run: bool,

    /// Log output format (text, json, or pretty)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    // Log settings may come from .env as well
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    LoggingConfig::from_env(cli.log_format, cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let mut context = RunContext::from_config(&config)?;

    let mode = if cli.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Publish
    };

    match context.run(mode).await? {
        RunOutcome::WouldPost(path) => println!("{}", path.display()),
        RunOutcome::NothingToPost if cli.dry_run => println!("No new videos found to post"),
        RunOutcome::NothingToPost | RunOutcome::Published(_) => {}
    }

    Ok(())
}
