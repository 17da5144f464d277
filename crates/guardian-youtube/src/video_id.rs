//! Video id extraction from YouTube URLs

use guardian_core::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:v=|/shorts/|/embed/|youtu\.be/)([A-Za-z0-9_-]{11})")
            .expect("video id pattern is valid")
    })
}

/// Extract the 11-character video id from a watch, shorts, embed or
/// `youtu.be` URL
pub fn extract_video_id(url: &str) -> Result<String> {
    video_id_pattern()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| Error::upstream("Invalid YouTube URL"))
}
