//! Core types for Loopcast

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StateError;

/// Hashtag attached to every post
pub const POST_TAG: &str = "samplethis";

/// Content type sent with every upload, whatever the file actually holds
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Sequence number of a video file
///
/// Rendered as a zero-padded 5-digit decimal string. The sequence is capped
/// at [`VideoId::MAX`]: there is no successor to `99999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoId(u32);

impl VideoId {
    /// Number of digits in a file name prefix
    pub const WIDTH: usize = 5;

    /// Largest identifier that fits the 5-digit prefix
    pub const MAX: u32 = 99_999;

    /// The `"00000"` sentinel that starts every tracking file
    pub const SENTINEL: VideoId = VideoId(0);

    pub fn new(value: u32) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    /// Parse a stored identifier such as `"00042"`
    pub fn parse(s: &str) -> Result<Self, StateError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StateError::InvalidId(s.to_string()));
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| StateError::InvalidId(s.to_string()))
    }

    /// Take the identifier from the first five characters of a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let prefix = name.get(..Self::WIDTH)?;
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse::<u32>().ok().and_then(Self::new)
    }

    /// Next identifier in the sequence, or `None` once the cap is reached
    pub fn successor(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = Self::WIDTH)
    }
}

/// Opaque blob reference returned by an upload
///
/// The remote service owns its shape; it is passed back verbatim in the embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(pub serde_json::Value);

/// Byte range of a facet within the post text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteSlice {
    pub byte_start: usize,
    pub byte_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum FacetFeature {
    #[serde(rename = "app.bsky.richtext.facet#tag")]
    Tag { tag: String },
}

/// Rich-text annotation over a byte range of the post text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub index: ByteSlice,
    pub features: Vec<FacetFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum Embed {
    #[serde(rename = "app.bsky.embed.video")]
    Video { video: BlobRef, alt: String },
}

/// Post announcing one video of the loop sequence
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPost {
    pub id: VideoId,
    pub text: String,
    pub facets: Vec<Facet>,
    pub embed: Embed,
}

impl VideoPost {
    /// Build the post for video `id` embedding the uploaded `blob`
    ///
    /// Text is `loop<id>_ #samplethis`; the single facet runs from the first
    /// `#` to the end of the text and always carries the fixed tag.
    pub fn new(id: VideoId, blob: BlobRef) -> Self {
        let label = format!("loop{}_", id);
        let text = format!("{} #{}", label, POST_TAG);
        let byte_start = text.find('#').unwrap_or(text.len());

        Self {
            id,
            facets: vec![Facet {
                index: ByteSlice {
                    byte_start,
                    byte_end: text.len(),
                },
                features: vec![FacetFeature::Tag {
                    tag: POST_TAG.to_string(),
                }],
            }],
            embed: Embed::Video {
                video: blob,
                alt: label,
            },
            text,
        }
    }

    /// Alt text of the embedded video
    pub fn alt_text(&self) -> &str {
        match &self.embed {
            Embed::Video { alt, .. } => alt,
        }
    }

    /// Render as an `app.bsky.feed.post` record
    pub fn to_record(&self, created_at: chrono::DateTime<chrono::Utc>) -> PostRecord<'_> {
        PostRecord {
            kind: "app.bsky.feed.post",
            text: &self.text,
            facets: &self.facets,
            embed: &self.embed,
            created_at: created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Wire form of a feed post record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub facets: &'a [Facet],
    pub embed: &'a Embed,
    pub created_at: String,
}
