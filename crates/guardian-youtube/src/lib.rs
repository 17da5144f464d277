//! Guardian YouTube
//!
//! Pulls top-level comments for a video from the YouTube Data API (v3):
//! - [`extract_video_id`] finds the 11-character id in the common URL shapes
//! - [`YouTubeClient`] talks to the `commentThreads` and `videos` endpoints
//! - [`fetch_comments`] pages through any [`CommentSource`] up to a limit

pub mod client;
pub mod fetcher;
pub mod video_id;

pub use client::{CommentOrder, CommentPage, CommentSource, PageRequest, YouTubeClient};
pub use fetcher::{fetch_comments, MAX_PAGE_SIZE};
pub use video_id::extract_video_id;
