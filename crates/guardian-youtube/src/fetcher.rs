//! Paginated comment fetching

use crate::client::{CommentOrder, CommentSource, PageRequest};
use guardian_core::{Comment, Result};

/// Largest page the API will return
pub const MAX_PAGE_SIZE: usize = 100;

/// Fetch up to `max_comments` top-level comments for a video.
///
/// Each request asks for at most [`MAX_PAGE_SIZE`] or the number still
/// needed, whichever is smaller. Stops once the limit is reached or the
/// source reports no further page.
pub async fn fetch_comments(
    source: &dyn CommentSource,
    video_id: &str,
    max_comments: usize,
    order: CommentOrder,
) -> Result<Vec<Comment>> {
    let mut comments: Vec<Comment> = Vec::new();
    let mut page_token: Option<String> = None;

    while comments.len() < max_comments {
        let remaining = max_comments - comments.len();
        let page = source
            .list_comment_page(PageRequest {
                video_id: video_id.to_string(),
                max_results: remaining.min(MAX_PAGE_SIZE),
                page_token: page_token.take(),
                order,
            })
            .await?;

        comments.extend(page.comments);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    comments.truncate(max_comments);
    tracing::debug!(video_id, fetched = comments.len(), "Fetched comments");
    Ok(comments)
}
