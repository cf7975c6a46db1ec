//! YouTube Data API v3 client
//!
//! Thin typed wrapper over the REST endpoints this service needs: video
//! metadata, channel upload listings, and top-level comment threads. All
//! failures surface as [`Error::Upstream`] for the handlers to map.

use crate::types::{ChannelVideo, VideoMetadata};
use crate::urls::{extract_video_id, parse_channel_ref, parse_duration_seconds, ChannelRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use vidpulse_core::{Error, Result};

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum page size accepted by the list endpoints
const MAX_PAGE_SIZE: usize = 50;

/// YouTube Data API client
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl YouTubeClient {
    /// Create a client against the public Data API
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_api_base(api_key, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base (tests, proxies)
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into(),
        })
    }

    /// Fetch metadata for a video URL
    pub async fn video_metadata(&self, video_url: &str) -> Result<VideoMetadata> {
        let video_id = extract_video_id(video_url).ok_or_else(|| {
            Error::config(format!("could not extract a video id from '{video_url}'"))
        })?;

        let response: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,statistics,contentDetails"),
                    ("id", &video_id),
                ],
            )
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream(format!("video '{video_id}' not found")))?;

        Ok(video_metadata_from_item(&video_id, item))
    }

    /// List a channel's most recent uploads, newest first, up to `max_videos`
    pub async fn channel_videos(
        &self,
        channel_url: &str,
        max_videos: usize,
    ) -> Result<Vec<ChannelVideo>> {
        let channel_id = match parse_channel_ref(channel_url).ok_or_else(|| {
            Error::config(format!(
                "could not extract a channel id from '{channel_url}'; use \
                 https://www.youtube.com/@channelname or https://www.youtube.com/channel/UCXXXXXX"
            ))
        })? {
            ChannelRef::Id(id) => id,
            ChannelRef::Handle(handle) => self.resolve_channel_handle(&handle).await?,
        };

        if max_videos == 0 {
            return Ok(Vec::new());
        }

        let uploads_playlist = self.uploads_playlist(&channel_id).await?;
        debug!(channel = %channel_id, playlist = %uploads_playlist, "resolved uploads playlist");

        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = (max_videos - videos.len()).min(MAX_PAGE_SIZE);
            let page_size_str = page_size.to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("playlistId", uploads_playlist.as_str()),
                ("maxResults", page_size_str.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: PlaylistItemsResponse = self.get_json("playlistItems", &query).await?;

            for item in page.items {
                if videos.len() >= max_videos {
                    break;
                }
                let video_id = item.snippet.resource_id.video_id;
                let stats = self.video_statistics(&video_id).await?;
                videos.push(ChannelVideo {
                    id: video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    view_count: stats.0,
                    like_count: stats.1,
                    published_at: date_prefix(&item.snippet.published_at),
                    thumbnail: item
                        .snippet
                        .thumbnails
                        .and_then(Thumbnails::best_url)
                        .unwrap_or_default(),
                });
            }

            page_token = page.next_page_token;
            if page_token.is_none() || videos.len() >= max_videos {
                break;
            }
        }

        Ok(videos)
    }

    /// Fetch up to `max_comments` top-level comment texts for a video
    pub async fn video_comments(&self, video_id: &str, max_comments: usize) -> Result<Vec<String>> {
        if max_comments == 0 {
            return Ok(Vec::new());
        }

        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = (max_comments - comments.len()).min(100);
            let page_size_str = page_size.to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", page_size_str.as_str()),
                ("textFormat", "plainText"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: CommentThreadsResponse = self.get_json("commentThreads", &query).await?;

            for thread in page.items {
                if comments.len() >= max_comments {
                    break;
                }
                let text = thread.snippet.top_level_comment.snippet.text();
                if !text.is_empty() {
                    comments.push(text);
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() || comments.len() >= max_comments {
                break;
            }
        }

        Ok(comments)
    }

    /// Resolve an `@handle` to a channel id via channel search
    async fn resolve_channel_handle(&self, handle: &str) -> Result<String> {
        let response: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", handle),
                    ("type", "channel"),
                    ("maxResults", "1"),
                ],
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.id.channel_id)
            .ok_or_else(|| Error::upstream(format!("failed to find channel for handle '@{handle}'")))
    }

    /// Look up a channel's uploads playlist id
    async fn uploads_playlist(&self, channel_id: &str) -> Result<String> {
        let response: ChannelListResponse = self
            .get_json("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| {
                Error::upstream(format!(
                    "channel '{channel_id}' not found or the API key has no access"
                ))
            })
    }

    /// Fetch (views, likes) for one video
    async fn video_statistics(&self, video_id: &str) -> Result<(u64, u64)> {
        let response: VideoListResponse = self
            .get_json(
                "videos",
                &[("part", "statistics,contentDetails"), ("id", video_id)],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.statistics)
            .map(|stats| (stats.views(), stats.likes()))
            .unwrap_or((0, 0)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.api_base, path);
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("YouTube API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!(
                "YouTube API returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("YouTube API returned invalid JSON: {e}")))
    }
}

fn video_metadata_from_item(video_id: &str, item: VideoItem) -> VideoMetadata {
    VideoMetadata {
        title: item.snippet.as_ref().map(|s| s.title.clone()),
        channel: item.snippet.as_ref().and_then(|s| s.channel_title.clone()),
        views: item.statistics.as_ref().map(VideoStatistics::views),
        likes: item.statistics.as_ref().map(VideoStatistics::likes),
        duration: item
            .content_details
            .as_ref()
            .and_then(|d| d.duration.as_deref())
            .and_then(parse_duration_seconds),
        url: Some(format!("https://www.youtube.com/watch?v={video_id}")),
    }
}

/// Date prefix (YYYY-MM-DD) of an RFC 3339 timestamp
fn date_prefix(timestamp: &str) -> String {
    timestamp.get(..10).unwrap_or(timestamp).to_string()
}

// ---- Data API wire types -------------------------------------------------

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: String,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

impl VideoStatistics {
    fn views(&self) -> u64 {
        parse_count(self.view_count.as_deref())
    }

    fn likes(&self) -> u64 {
        parse_count(self.like_count.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: String,
    resource_id: ResourceId,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(self) -> Option<String> {
        self.high.or(self.default).map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_original: Option<String>,
    text_display: Option<String>,
}

impl CommentSnippet {
    fn text(&self) -> String {
        self.text_original
            .clone()
            .or_else(|| self.text_display.clone())
            .unwrap_or_default()
    }
}

fn parse_count(count: Option<&str>) -> u64 {
    count.and_then(|c| c.parse().ok()).unwrap_or(0)
}
