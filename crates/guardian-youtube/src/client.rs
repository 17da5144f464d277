//! YouTube Data API client

use async_trait::async_trait;
use guardian_core::{coerce_text, Comment, Error, Result, VideoInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Comment ordering supported by `commentThreads.list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentOrder {
    #[default]
    Relevance,
    Time,
}

impl CommentOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Time => "time",
        }
    }
}

impl FromStr for CommentOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "time" => Ok(Self::Time),
            other => Err(format!("Unknown comment order: {}", other)),
        }
    }
}

impl fmt::Display for CommentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page request against the comment listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub video_id: String,
    pub max_results: usize,
    pub page_token: Option<String>,
    pub order: CommentOrder,
}

/// One page of comments plus the token for the next page, if any
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    pub next_page_token: Option<String>,
}

/// Anything that can list a video's comments page by page
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch a single page of top-level comments
    async fn list_comment_page(&self, request: PageRequest) -> Result<CommentPage>;

    /// Fetch title and channel for a video
    async fn video_info(&self, video_id: &str) -> Result<VideoInfo>;
}

/// `commentThreads.list` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    #[serde(default)]
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
    #[serde(default)]
    text_display: serde_json::Value,
    #[serde(default)]
    author_display_name: String,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    published_at: String,
}

impl From<CommentSnippet> for Comment {
    fn from(snippet: CommentSnippet) -> Self {
        Self {
            text: coerce_text(&snippet.text_display),
            author: snippet.author_display_name,
            like_count: snippet.like_count,
            published_at: snippet.published_at,
        }
    }
}

/// `videos.list` response
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

/// HTTP client for the YouTube Data API
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    /// Create a client against the public API
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("Missing YOUTUBE_API_KEY"));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::upstream(format!("YouTube API request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(format!("Failed to read YouTube API response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| format!("YouTube API error {}: {}", e.error.code, e.error.message))
                .unwrap_or_else(|_| format!("YouTube API returned {}", status));
            tracing::warn!("{} ({})", message, endpoint);
            return Err(Error::upstream(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::upstream(format!("Invalid YouTube API response: {}", e)))
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn list_comment_page(&self, request: PageRequest) -> Result<CommentPage> {
        let mut query = vec![
            ("part", "snippet".to_string()),
            ("videoId", request.video_id.clone()),
            ("maxResults", request.max_results.to_string()),
            ("textFormat", "plainText".to_string()),
            ("order", request.order.as_str().to_string()),
        ];
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.clone()));
        }

        tracing::debug!(
            video_id = %request.video_id,
            max_results = request.max_results,
            "Requesting comment page"
        );

        let response: CommentThreadListResponse = self.get_json("commentThreads", &query).await?;

        Ok(CommentPage {
            comments: response
                .items
                .into_iter()
                .map(|thread| Comment::from(thread.snippet.top_level_comment.snippet))
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let query = [
            ("part", "snippet".to_string()),
            ("id", video_id.to_string()),
        ];
        let response: VideoListResponse = self.get_json("videos", &query).await?;

        let snippet = response
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet)
            .ok_or_else(|| Error::upstream(format!("Video not found: {}", video_id)))?;

        Ok(VideoInfo {
            video_id: video_id.to_string(),
            title: snippet.title,
            channel_title: snippet.channel_title,
        })
    }
}
