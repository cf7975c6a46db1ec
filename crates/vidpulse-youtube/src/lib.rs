//! VidPulse YouTube
//!
//! YouTube Data API v3 client and URL helpers for video metadata, channel
//! upload listings, and comment threads.

pub mod client;
pub mod types;
pub mod urls;

pub use client::YouTubeClient;
pub use types::{ChannelVideo, VideoMetadata};
pub use urls::{extract_video_id, parse_channel_ref, parse_duration_seconds, ChannelRef};
