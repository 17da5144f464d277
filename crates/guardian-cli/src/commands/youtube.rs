use crate::cli::{ReportFormat, YoutubeArgs};
use crate::output::{write_output, YoutubeReport};
use anyhow::{bail, Result};
use guardian_youtube::{extract_video_id, fetch_comments, CommentSource, YouTubeClient};
use tracing::{info, warn};

pub async fn run(args: YoutubeArgs) -> Result<()> {
    let settings = super::load_settings(&args.model)?;
    if !settings.has_youtube_key() {
        bail!("Missing YOUTUBE_API_KEY");
    }

    info!("Analyzing YouTube video: {}", args.url);
    let video_id = extract_video_id(&args.url)?;
    let client = YouTubeClient::new(settings.youtube_api_key.clone())?;

    let video_info = client.video_info(&video_id).await?;
    let comments = fetch_comments(&client, &video_id, args.max_comments, args.order).await?;

    if comments.is_empty() {
        warn!("No comments found for this video");
        return Ok(());
    }
    info!("Fetched {} comments", comments.len());

    let scorer = super::load_scorer(&settings)?;
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let predictions = scorer.predict(&texts, args.threshold)?;

    let report = YoutubeReport::build(video_info, comments, predictions);
    let rendered = match args.format {
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
        ReportFormat::Text => report.to_text(),
    };

    write_output(&rendered, args.output.as_deref())
}
