//! Domain types returned by the YouTube client

use serde::{Deserialize, Serialize};

/// Metadata for a single video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video title
    pub title: Option<String>,

    /// Channel (uploader) name
    pub channel: Option<String>,

    /// View count
    pub views: Option<u64>,

    /// Like count
    pub likes: Option<u64>,

    /// Duration in seconds
    pub duration: Option<u64>,

    /// Canonical watch URL
    pub url: Option<String>,
}

/// One video in a channel's uploads listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelVideo {
    /// Video id
    pub id: String,

    /// Video title
    pub title: String,

    /// Video description
    pub description: String,

    /// View count
    pub view_count: u64,

    /// Like count
    pub like_count: u64,

    /// Publication date (YYYY-MM-DD)
    pub published_at: String,

    /// Thumbnail URL
    pub thumbnail: String,
}
