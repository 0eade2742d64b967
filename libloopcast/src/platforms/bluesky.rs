//! Bluesky platform implementation
//!
//! Talks to the PDS over plain XRPC: `com.atproto.server.createSession` for
//! login, `com.atproto.repo.uploadBlob` for the video bytes, and
//! `com.atproto.repo.createRecord` for the `app.bsky.feed.post` record.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{BlobRef, VideoPost};

const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Map Bluesky/AT Protocol errors to PlatformError
///
/// Classifies by the HTTP status and XRPC error code carried in the message.
///
/// # Arguments
///
/// * `error` - The error (status line plus XRPC error body, or transport error)
/// * `context` - The operation context (e.g., "authentication", "upload")
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PlatformError {
    let error_msg = format!("{}", error);
    let debug_msg = format!("{:?}", error);

    // Authentication errors (401, 403, or authentication-related error codes)
    if error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("AuthenticationRequired")
        || error_msg.contains("InvalidToken")
        || error_msg.contains("ExpiredToken")
        || debug_msg.contains("Unauthorized")
        || debug_msg.contains("Forbidden")
    {
        return PlatformError::Authentication(format!(
            "Bluesky authentication failed during {}: {}. Check BSKY_HANDLE and BSKY_PASSWORD.",
            context, error_msg
        ));
    }

    // Invalid credentials during login
    if error_msg.contains("InvalidCredentials")
        || error_msg.contains("AccountNotFound")
        || (context == "authentication" && error_msg.contains("invalid"))
    {
        return PlatformError::Authentication(format!(
            "Invalid Bluesky credentials: {}. Please check your handle and app password.",
            error_msg
        ));
    }

    // Validation errors (400 status or validation-related error codes)
    if error_msg.contains("400")
        || error_msg.contains("InvalidRequest")
        || error_msg.contains("InvalidRecord")
        || error_msg.contains("BlobTooLarge")
        || debug_msg.contains("BadRequest")
    {
        return PlatformError::Validation(format!(
            "Bluesky rejected the request during {}: {}",
            context, error_msg
        ));
    }

    // Rate limiting (429 status)
    if error_msg.contains("429")
        || error_msg.contains("RateLimitExceeded")
        || debug_msg.contains("RateLimit")
    {
        return PlatformError::RateLimit(format!(
            "Bluesky rate limit exceeded during {}: {}. Try again on the next run.",
            context, error_msg
        ));
    }

    // Network/connection errors (PDS unreachable, timeouts, connection failures)
    if error_msg.contains("connection")
        || error_msg.contains("network")
        || error_msg.contains("timeout")
        || error_msg.contains("timed out")
        || error_msg.contains("unreachable")
        || error_msg.contains("dns")
        || debug_msg.contains("Connect")
        || debug_msg.contains("Timeout")
    {
        return PlatformError::Network(format!(
            "Network error while connecting to Bluesky PDS during {}: {}",
            context, error_msg
        ));
    }

    PlatformError::Posting(format!(
        "Bluesky operation failed during {}: {}",
        context, error_msg
    ))
}

/// Map a transport-level reqwest failure
fn map_request_error(error: reqwest::Error, context: &str) -> PlatformError {
    if error.is_timeout() || error.is_connect() {
        return PlatformError::Network(format!(
            "Network error while connecting to Bluesky PDS during {}: {}",
            context, error
        ));
    }
    map_bluesky_error(error, context)
}

/// XRPC error body, e.g. `{"error":"AuthenticationRequired","message":"..."}`
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Render a failed XRPC response as "<status>: <error>: <message>"
fn describe_xrpc_error(status: StatusCode, body: &str) -> String {
    let parsed: XrpcErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut description = status.to_string();
    match (parsed.error, parsed.message) {
        (Some(code), Some(message)) => {
            description.push_str(&format!(": {}: {}", code, message));
        }
        (Some(code), None) => description.push_str(&format!(": {}", code)),
        (None, Some(message)) => description.push_str(&format!(": {}", message)),
        (None, None) if !body.trim().is_empty() => {
            description.push_str(&format!(": {}", body.trim()))
        }
        (None, None) => {}
    }
    description
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct UploadBlobResponse {
    blob: BlobRef,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

pub struct BlueskyClient {
    http: Client,
    service_url: String,
    handle: String,
    app_password: SecretString,
    session: Option<Session>,
}

impl BlueskyClient {
    /// Create a new Bluesky client
    ///
    /// # Arguments
    ///
    /// * `service_url` - PDS or entryway base URL (e.g., "https://bsky.social")
    /// * `handle` - The Bluesky handle (e.g., "user.bsky.social")
    /// * `app_password` - The app password for authentication
    pub fn new(service_url: &str, handle: String, app_password: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("loopcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            service_url: service_url.trim_end_matches('/').to_string(),
            handle,
            app_password: SecretString::from(app_password),
            session: None,
        })
    }

    /// Create a client from the run configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.service_url,
            config.handle.clone(),
            config.password().to_string(),
        )
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, method)
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| PlatformError::Authentication("Not authenticated".to_string()).into())
    }

    /// Turn a non-success XRPC response into a classified error
    async fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_bluesky_error(describe_xrpc_error(status, &body), context).into())
    }

    /// Create a session with Bluesky
    ///
    /// Stores the access token and DID for the upload and post calls.
    async fn create_session(&mut self) -> Result<()> {
        tracing::debug!("Creating Bluesky session for handle: {}", self.handle);

        let body = serde_json::json!({
            "identifier": self.handle,
            "password": self.app_password.expose_secret(),
        });

        let response = self
            .http
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(e, "authentication"))?;
        let response = Self::check(response, "authentication").await?;

        let session: Session = response
            .json()
            .await
            .map_err(|e| map_request_error(e, "authentication"))?;

        tracing::debug!("Bluesky session created for {} ({})", session.handle, session.did);
        self.session = Some(session);

        Ok(())
    }
}

#[async_trait]
impl Platform for BlueskyClient {
    async fn authenticate(&mut self) -> Result<()> {
        self.create_session().await
    }

    async fn upload_blob(&self, data: Vec<u8>, mime_type: &str) -> Result<BlobRef> {
        let session = self.session()?;
        tracing::debug!("Uploading {} bytes as {}", data.len(), mime_type);

        let response = self
            .http
            .post(self.xrpc_url("com.atproto.repo.uploadBlob"))
            .bearer_auth(&session.access_jwt)
            .header(CONTENT_TYPE, mime_type)
            .body(data)
            .send()
            .await
            .map_err(|e| map_request_error(e, "upload"))?;
        let response = Self::check(response, "upload").await?;

        let uploaded: UploadBlobResponse = response
            .json()
            .await
            .map_err(|e| map_request_error(e, "upload"))?;

        Ok(uploaded.blob)
    }

    async fn create_post(&self, post: &VideoPost) -> Result<String> {
        let session = self.session()?;
        tracing::debug!("Posting to Bluesky: {}", post.text);

        let body = serde_json::json!({
            "repo": session.did,
            "collection": POST_COLLECTION,
            "record": post.to_record(chrono::Utc::now()),
        });

        let response = self
            .http
            .post(self.xrpc_url("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(e, "posting"))?;
        let response = Self::check(response, "posting").await?;

        let created: CreateRecordResponse = response
            .json()
            .await
            .map_err(|e| map_request_error(e, "posting"))?;

        tracing::debug!("Posted to Bluesky: {}", created.uri);
        Ok(created.uri)
    }

    fn name(&self) -> &str {
        "bluesky"
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
